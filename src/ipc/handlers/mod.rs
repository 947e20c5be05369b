pub mod core;
pub mod lessons;
pub mod students;
pub mod views;

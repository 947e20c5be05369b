use std::collections::HashMap;

use serde::Deserialize;

use crate::config::Settings;
use crate::store::{MemoryStore, StudentRepository};
use crate::view::ViewSession;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub settings: Settings,
    pub store: Box<dyn StudentRepository>,
    /// Open list screens keyed by view id.
    pub views: HashMap<String, ViewSession>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let store = if settings.store.seed_mock_data {
            MemoryStore::seeded()
        } else {
            MemoryStore::default()
        };
        Self {
            settings,
            store: Box::new(store),
            views: HashMap::new(),
        }
    }
}

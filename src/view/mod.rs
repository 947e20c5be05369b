mod compose;
mod filter;
mod page;
mod selection;
mod sort;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::roster::StudentStatus;

pub use compose::ViewSession;
pub use page::{PageAction, PageInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(StudentStatus),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Some(StatusFilter::All);
        }
        StudentStatus::parse(raw).map(StatusFilter::Only)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Name,
    Status,
    Age,
    Credits,
    NextLesson,
}

impl SortColumn {
    pub const NAMES: [&'static str; 5] = ["name", "status", "age", "credits", "nextLesson"];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(SortColumn::Name),
            "status" => Some(SortColumn::Status),
            "age" => Some(SortColumn::Age),
            "credits" => Some(SortColumn::Credits),
            "nextLesson" => Some(SortColumn::NextLesson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            column: SortColumn::Name,
            direction: SortDirection::Asc,
        }
    }
}

/// User-controlled list state for one screen. Selection lives next to it in
/// the session, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub search: String,
    pub status: StatusFilter,
    pub tags: BTreeSet<String>,
    pub sort: SortSpec,
    pub page: usize,
    pub page_size: usize,
}

impl ViewParams {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            tags: BTreeSet::new(),
            sort: SortSpec::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn has_filters(&self) -> bool {
        !self.search.trim().is_empty() || self.status != StatusFilter::All || !self.tags.is_empty()
    }
}

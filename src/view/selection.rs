use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    None,
    Some,
    All,
}

/// Checked row ids for one list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Check every filtered row (not just the visible page), or clear all.
    pub fn toggle_all<'a, I>(&mut self, checked: bool, filtered_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ids.clear();
        if checked {
            self.ids.extend(filtered_ids.into_iter().map(str::to_string));
        }
    }

    pub fn retain(&mut self, filtered_ids: &BTreeSet<&str>) {
        self.ids.retain(|id| filtered_ids.contains(id.as_str()));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids that are currently in the filtered set.
    pub fn visible_count(&self, filtered_ids: &BTreeSet<&str>) -> usize {
        self.ids
            .iter()
            .filter(|id| filtered_ids.contains(id.as_str()))
            .count()
    }

    pub fn is_all_selected(&self, filtered_ids: &BTreeSet<&str>) -> bool {
        !filtered_ids.is_empty() && self.visible_count(filtered_ids) == filtered_ids.len()
    }

    pub fn is_indeterminate(&self, filtered_ids: &BTreeSet<&str>) -> bool {
        let n = self.visible_count(filtered_ids);
        n > 0 && n < filtered_ids.len()
    }

    pub fn state(&self, filtered_ids: &BTreeSet<&str>) -> TriState {
        if self.is_all_selected(filtered_ids) {
            TriState::All
        } else if self.is_indeterminate(filtered_ids) {
            TriState::Some
        } else {
            TriState::None
        }
    }
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::roster::{same_tag, StudentRecord, StudentStatus, TagColor};

use super::filter::filter_records;
use super::page::{clamp_page, paginate, total_pages, PageAction, PageInfo};
use super::selection::{Selection, TriState};
use super::sort::sort_records;
use super::{SortSpec, StatusFilter, ViewParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewState {
    Loading,
    Empty,
    Populated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyReason {
    NoResults,
    NoRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyAction {
    ClearFilters,
    AddRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagChip {
    pub label: String,
    pub color: TagColor,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextLessonView {
    pub date: NaiveDate,
    pub time: String,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub id: String,
    pub name: String,
    pub status: StudentStatus,
    pub status_label: &'static str,
    pub is_child: bool,
    pub age: Option<u32>,
    pub family_name: Option<String>,
    pub email: Option<String>,
    pub tags: Vec<TagChip>,
    pub credits: u32,
    pub next_lesson: Option<NextLessonView>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: StudentStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub selected_ids: Vec<String>,
    pub selected_count: usize,
    pub hidden_count: usize,
    pub state: TriState,
    pub all_selected: bool,
    pub indeterminate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamsView {
    pub search: String,
    pub status: &'static str,
    pub tags: Vec<String>,
    pub sort: SortSpec,
    pub has_filters: bool,
}

/// Everything a list screen needs for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub view_id: String,
    pub state: ViewState,
    pub empty_reason: Option<EmptyReason>,
    pub empty_action: Option<EmptyAction>,
    pub rows: Vec<RowView>,
    pub filtered_count: usize,
    pub total_count: usize,
    pub status_counts: Vec<StatusCount>,
    pub available_tags: Vec<TagChip>,
    pub selection: SelectionView,
    pub pagination: PageInfo,
    pub bulk_actions_visible: bool,
    pub tag_modal_open: bool,
    pub params: ParamsView,
}

/// View-model state owned by one open list screen.
#[derive(Debug, Clone)]
pub struct ViewSession {
    id: String,
    params: ViewParams,
    selection: Selection,
    records: Option<Vec<StudentRecord>>,
    tag_modal_open: bool,
    prune_hidden: bool,
    reference_date: Option<NaiveDate>,
}

impl ViewSession {
    pub fn new(id: String, page_size: usize, prune_hidden: bool) -> Self {
        Self {
            id,
            params: ViewParams::new(page_size),
            selection: Selection::default(),
            records: None,
            tag_modal_open: false,
            prune_hidden,
            reference_date: None,
        }
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn is_loading(&self) -> bool {
        self.records.is_none()
    }

    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    pub fn set_reference_date(&mut self, date: Option<NaiveDate>) {
        self.reference_date = date;
    }

    /// Replace the record snapshot (end of the loading phase or a refresh).
    pub fn load(&mut self, records: Vec<StudentRecord>) {
        let was_loading = self.records.is_none();
        self.records = Some(records);
        if was_loading {
            info!(view_id = %self.id, "view loaded");
        }
        self.filters_changed(false);
    }

    pub fn set_search(&mut self, search: &str) {
        if self.params.search != search {
            self.params.search = search.to_string();
            self.filters_changed(true);
        }
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        if self.params.status != status {
            self.params.status = status;
            self.filters_changed(true);
        }
    }

    pub fn set_tags(&mut self, tags: BTreeSet<String>) {
        if self.params.tags != tags {
            self.params.tags = tags;
            self.filters_changed(true);
        }
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.params.sort = sort;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        if self.params.page_size != page_size {
            self.params.page_size = page_size;
            self.params.page = 1;
        }
    }

    pub fn clear_filters(&mut self) {
        let had = self.params.has_filters();
        self.params.search.clear();
        self.params.status = StatusFilter::All;
        self.params.tags.clear();
        if had {
            self.filters_changed(true);
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.params.page = clamp_page(page, self.total_pages());
    }

    pub fn step_page(&mut self, action: PageAction) {
        self.params.page = action.apply(self.params.page, self.total_pages());
    }

    /// Flip one row. Returns false when the id is not in the loaded snapshot,
    /// or, while hidden rows are pruned, not in the filtered set.
    pub fn toggle(&mut self, id: &str) -> bool {
        let known = if self.prune_hidden {
            self.filtered_ids().iter().any(|f| f == id)
        } else {
            self.records
                .as_ref()
                .map(|rs| rs.iter().any(|r| r.id == id))
                .unwrap_or(false)
        };
        if known {
            self.selection.toggle(id);
        }
        known
    }

    pub fn toggle_all(&mut self, checked: bool) {
        let filtered = self.filtered_ids();
        self.selection
            .toggle_all(checked, filtered.iter().map(String::as_str));
    }

    pub fn set_tag_modal(&mut self, open: bool) {
        self.tag_modal_open = open;
    }

    fn filtered_ids(&self) -> Vec<String> {
        match self.records.as_ref() {
            Some(records) => filter_records(records, &self.params)
                .into_iter()
                .map(|(_, r)| r.id.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    fn total_pages(&self) -> usize {
        total_pages(self.filtered_ids().len(), self.params.page_size)
    }

    fn filters_changed(&mut self, reset_page: bool) {
        if reset_page {
            self.params.page = 1;
        }
        let filtered = self.filtered_ids();
        self.params.page = clamp_page(
            self.params.page,
            total_pages(filtered.len(), self.params.page_size),
        );
        if self.prune_hidden {
            let keep: BTreeSet<&str> = filtered.iter().map(String::as_str).collect();
            let before = self.selection.len();
            self.selection.retain(&keep);
            if before != self.selection.len() {
                debug!(
                    view_id = %self.id,
                    pruned = before - self.selection.len(),
                    "selection pruned to filtered set"
                );
            }
        }
    }

    pub fn snapshot(&self, today: NaiveDate) -> ViewSnapshot {
        let params = &self.params;
        let params_view = ParamsView {
            search: params.search.clone(),
            status: params.status.as_str(),
            tags: params.tags.iter().cloned().collect(),
            sort: params.sort,
            has_filters: params.has_filters(),
        };

        let Some(records) = self.records.as_ref() else {
            return ViewSnapshot {
                view_id: self.id.clone(),
                state: ViewState::Loading,
                empty_reason: None,
                empty_action: None,
                rows: Vec::new(),
                filtered_count: 0,
                total_count: 0,
                status_counts: status_counts(&[]),
                available_tags: Vec::new(),
                selection: SelectionView {
                    selected_ids: self.selection.ids().map(str::to_string).collect(),
                    selected_count: self.selection.len(),
                    hidden_count: self.selection.len(),
                    state: TriState::None,
                    all_selected: false,
                    indeterminate: false,
                },
                pagination: PageInfo::for_total(0, 1, params.page_size),
                bulk_actions_visible: false,
                tag_modal_open: self.tag_modal_open,
                params: params_view,
            };
        };

        let mut filtered = filter_records(records, params);
        sort_records(&mut filtered, params.sort, today);
        let filtered_ids: BTreeSet<&str> = filtered.iter().map(|(_, r)| r.id.as_str()).collect();

        let page = clamp_page(params.page, total_pages(filtered.len(), params.page_size));
        let slice = paginate(&filtered, page, params.page_size);
        let rows = slice
            .items
            .iter()
            .map(|(_, r)| self.row_view(r, today))
            .collect();

        let (state, empty_reason, empty_action) = if !filtered.is_empty() {
            (ViewState::Populated, None, None)
        } else if params.has_filters() {
            (
                ViewState::Empty,
                Some(EmptyReason::NoResults),
                Some(EmptyAction::ClearFilters),
            )
        } else {
            (
                ViewState::Empty,
                Some(EmptyReason::NoRecords),
                Some(EmptyAction::AddRecord),
            )
        };

        let visible = self.selection.visible_count(&filtered_ids);
        let bulk_actions_visible = state == ViewState::Populated
            && if self.prune_hidden {
                visible > 0
            } else {
                !self.selection.is_empty()
            };
        let selection = SelectionView {
            selected_ids: self.selection.ids().map(str::to_string).collect(),
            selected_count: self.selection.len(),
            hidden_count: self.selection.len() - visible,
            state: self.selection.state(&filtered_ids),
            all_selected: self.selection.is_all_selected(&filtered_ids),
            indeterminate: self.selection.is_indeterminate(&filtered_ids),
        };

        ViewSnapshot {
            view_id: self.id.clone(),
            state,
            empty_reason,
            empty_action,
            rows,
            filtered_count: filtered.len(),
            total_count: records.len(),
            status_counts: status_counts(records),
            available_tags: available_tags(records, &params.tags),
            selection,
            pagination: PageInfo::from_slice(&slice, page, params.page_size, filtered.len()),
            bulk_actions_visible,
            tag_modal_open: self.tag_modal_open,
            params: params_view,
        }
    }

    fn row_view(&self, r: &StudentRecord, today: NaiveDate) -> RowView {
        RowView {
            id: r.id.clone(),
            name: r.full_name(),
            status: r.status,
            status_label: r.status.label(),
            is_child: r.profile.is_child(),
            age: r.age_on(today),
            family_name: r.family_name().map(str::to_string),
            email: r.email.clone(),
            tags: r
                .tags
                .iter()
                .map(|t| TagChip {
                    label: t.clone(),
                    color: TagColor::for_tag(t),
                    active: self.params.tags.iter().any(|a| same_tag(a, t)),
                })
                .collect(),
            credits: r.credits,
            next_lesson: r.next_lesson.map(|l| NextLessonView {
                date: l.date,
                time: l.time.format("%H:%M").to_string(),
                is_today: l.is_today(today),
            }),
            selected: self.selection.contains(&r.id),
        }
    }
}

fn status_counts(records: &[StudentRecord]) -> Vec<StatusCount> {
    StudentStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            label: status.label(),
            count: records.iter().filter(|r| r.status == status).count(),
        })
        .collect()
}

/// Distinct tags across the snapshot, alphabetically.
fn available_tags(records: &[StudentRecord], active: &BTreeSet<String>) -> Vec<TagChip> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for t in records.iter().flat_map(|r| r.tags.iter()) {
        seen.entry(t.to_lowercase()).or_insert_with(|| t.clone());
    }
    seen.into_values()
        .map(|label| TagChip {
            color: TagColor::for_tag(&label),
            active: active.iter().any(|a| same_tag(a, &label)),
            label,
        })
        .collect()
}

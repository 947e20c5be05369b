use crate::roster::{same_tag, StudentRecord};

use super::{StatusFilter, ViewParams};

/// Search, status and tag predicates ANDed together. Tags match if the
/// record carries any one of the active tags, ignoring case.
pub fn matches(record: &StudentRecord, params: &ViewParams) -> bool {
    matches_search(record, &params.search)
        && matches_status(record, params.status)
        && matches_tags(record, params)
}

fn matches_search(record: &StudentRecord, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hay = [
        record.full_name(),
        record.family_name().unwrap_or_default().to_string(),
        record.email.clone().unwrap_or_default(),
    ];
    hay.iter().any(|h| h.to_lowercase().contains(&needle))
}

fn matches_status(record: &StudentRecord, status: StatusFilter) -> bool {
    match status {
        StatusFilter::All => true,
        StatusFilter::Only(s) => record.status == s,
    }
}

fn matches_tags(record: &StudentRecord, params: &ViewParams) -> bool {
    params.tags.is_empty()
        || record
            .tags
            .iter()
            .any(|t| params.tags.iter().any(|active| same_tag(t, active)))
}

/// Records passing `matches`, paired with their position in `records`.
pub fn filter_records<'a>(
    records: &'a [StudentRecord],
    params: &ViewParams,
) -> Vec<(usize, &'a StudentRecord)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(r, params))
        .collect()
}

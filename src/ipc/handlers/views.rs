use std::collections::BTreeSet;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::ipc::error::{bad_params, err, ok, store_err, ErrorCode};
use crate::ipc::helpers::{
    local_today, parse_bool, parse_date, parse_positive, required_str, view_mut,
};
use crate::ipc::types::{AppState, Request};
use crate::view::{
    PageAction, PageInfo, SortColumn, SortDirection, SortSpec, StatusFilter, ViewSession,
};

fn snapshot_response(req: &Request, view: &ViewSession) -> serde_json::Value {
    let today = view.reference_date().unwrap_or_else(local_today);
    ok(&req.id, json!({ "view": view.snapshot(today) }))
}

fn parse_page_size(
    req: &Request,
    v: Option<&serde_json::Value>,
    max: usize,
) -> Result<Option<usize>, serde_json::Value> {
    match parse_positive(v, "pageSize") {
        Ok(Some(n)) if n > max => Err(bad_params(
            &req.id,
            format!("pageSize must be in range 1..={}", max),
        )),
        Ok(v) => Ok(v),
        Err(msg) => Err(bad_params(&req.id, msg)),
    }
}

fn handle_view_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let page_size = match parse_page_size(
        req,
        req.params.get("pageSize"),
        state.settings.view.max_page_size,
    ) {
        Ok(v) => v.unwrap_or(state.settings.view.default_page_size),
        Err(e) => return e,
    };
    let defer_load = match parse_bool(req.params.get("deferLoad"), false) {
        Ok(v) => v,
        Err(m) => return bad_params(&req.id, format!("deferLoad {}", m)),
    };
    let reference_date = match parse_date(req.params.get("today"), "today") {
        Ok(v) => v,
        Err(msg) => return bad_params(&req.id, msg),
    };

    let view_id = Uuid::new_v4().to_string();
    let mut view = ViewSession::new(
        view_id.clone(),
        page_size,
        state.settings.selection.prune_hidden,
    );
    view.set_reference_date(reference_date);
    if !defer_load {
        match state.store.fetch_all() {
            Ok(records) => view.load(records),
            Err(e) => return store_err(&req.id, e),
        }
    }

    info!(
        view_id = %view_id,
        page_size,
        loading = view.is_loading(),
        "view opened"
    );
    let resp = snapshot_response(req, &view);
    state.views.insert(view_id, view);
    resp
}

fn handle_view_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    let records = match state.store.fetch_all() {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    view.load(records);
    snapshot_response(req, view)
}

fn handle_view_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match view_mut(state, req) {
        Ok(view) => snapshot_response(req, view),
        Err(e) => e,
    }
}

fn handle_view_close(state: &mut AppState, req: &Request) -> serde_json::Value {
    let view_id = match required_str(req, "viewId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.views.remove(&view_id).is_none() {
        return err(
            &req.id,
            ErrorCode::NotFound,
            "view not found",
            Some(json!({ "viewId": view_id })),
        );
    }
    info!(view_id = %view_id, "view closed");
    ok(&req.id, json!({ "viewId": view_id, "closed": true }))
}

#[derive(Debug, Default)]
struct ParamUpdate {
    search: Option<String>,
    status: Option<StatusFilter>,
    tags: Option<BTreeSet<String>>,
    sort_by: Option<SortColumn>,
    sort_dir: Option<SortDirection>,
    page_size: Option<usize>,
}

fn parse_param_update(req: &Request, max_page_size: usize) -> Result<ParamUpdate, serde_json::Value> {
    let p = &req.params;
    let bad = |msg: String| bad_params(&req.id, msg);
    let mut update = ParamUpdate::default();

    if let Some(v) = p.get("search").filter(|v| !v.is_null()) {
        let Some(s) = v.as_str() else {
            return Err(bad("search must be a string".to_string()));
        };
        update.search = Some(s.to_string());
    }

    if let Some(v) = p.get("status").filter(|v| !v.is_null()) {
        let parsed = v.as_str().and_then(StatusFilter::parse);
        let Some(status) = parsed else {
            return Err(bad(
                "status must be one of: all, active, trial, waiting, lead, inactive".to_string(),
            ));
        };
        update.status = Some(status);
    }

    if let Some(v) = p.get("tags").filter(|v| !v.is_null()) {
        let Some(arr) = v.as_array() else {
            return Err(bad("tags must be an array of strings".to_string()));
        };
        let mut tags = BTreeSet::new();
        for t in arr {
            let Some(s) = t.as_str() else {
                return Err(bad("tags must be an array of strings".to_string()));
            };
            let s = s.trim();
            if !s.is_empty() {
                tags.insert(s.to_string());
            }
        }
        update.tags = Some(tags);
    }

    if let Some(v) = p.get("sortBy").filter(|v| !v.is_null()) {
        let Some(column) = v.as_str().and_then(SortColumn::parse) else {
            return Err(bad(format!(
                "sortBy must be one of: {}",
                SortColumn::NAMES.join(", ")
            )));
        };
        update.sort_by = Some(column);
    }

    if let Some(v) = p.get("sortDir").filter(|v| !v.is_null()) {
        let Some(dir) = v.as_str().and_then(SortDirection::parse) else {
            return Err(bad("sortDir must be one of: asc, desc".to_string()));
        };
        update.sort_dir = Some(dir);
    }

    update.page_size = parse_page_size(req, p.get("pageSize"), max_page_size)?;
    Ok(update)
}

/// Clicking the active column header flips direction; a new column starts ascending.
fn next_sort(current: SortSpec, by: Option<SortColumn>, dir: Option<SortDirection>) -> SortSpec {
    let column = by.unwrap_or(current.column);
    let direction = match (by, dir) {
        (_, Some(d)) => d,
        (Some(c), None) if c == current.column => match current.direction {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        },
        (Some(_), None) => SortDirection::Asc,
        (None, None) => current.direction,
    };
    SortSpec { column, direction }
}

fn handle_view_set_params(state: &mut AppState, req: &Request) -> serde_json::Value {
    let update = match parse_param_update(req, state.settings.view.max_page_size) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    if let Some(search) = update.search.as_deref() {
        view.set_search(search);
    }
    if let Some(status) = update.status {
        view.set_status(status);
    }
    if let Some(tags) = update.tags {
        view.set_tags(tags);
    }
    if update.sort_by.is_some() || update.sort_dir.is_some() {
        let sort = next_sort(view.params().sort, update.sort_by, update.sort_dir);
        view.set_sort(sort);
    }
    if let Some(size) = update.page_size {
        view.set_page_size(size);
    }
    snapshot_response(req, view)
}

fn handle_view_clear_filters(state: &mut AppState, req: &Request) -> serde_json::Value {
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    view.clear_filters();
    snapshot_response(req, view)
}

fn handle_view_set_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    let page = match parse_positive(req.params.get("page"), "page") {
        Ok(Some(v)) => v,
        Ok(None) => return bad_params(&req.id, "missing page"),
        Err(msg) => return bad_params(&req.id, msg),
    };
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    view.set_page(page);
    snapshot_response(req, view)
}

fn handle_view_step_page(
    state: &mut AppState,
    req: &Request,
    action: PageAction,
) -> serde_json::Value {
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    view.step_page(action);
    snapshot_response(req, view)
}

fn handle_view_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if !view.toggle(&student_id) {
        return err(
            &req.id,
            ErrorCode::NotFound,
            "student not in view",
            Some(json!({ "studentId": student_id })),
        );
    }
    snapshot_response(req, view)
}

fn handle_view_toggle_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    let checked = match req.params.get("checked").and_then(|v| v.as_bool()) {
        Some(v) => v,
        None => return bad_params(&req.id, "missing checked"),
    };
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    view.toggle_all(checked);
    snapshot_response(req, view)
}

fn handle_view_tag_modal(state: &mut AppState, req: &Request) -> serde_json::Value {
    let open = match req.params.get("open").and_then(|v| v.as_bool()) {
        Some(v) => v,
        None => return bad_params(&req.id, "missing open"),
    };
    let view = match view_mut(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    view.set_tag_modal(open);
    snapshot_response(req, view)
}

/// Pager for a list the UI only knows the size of.
fn handle_pagination_describe(state: &mut AppState, req: &Request) -> serde_json::Value {
    let total_items = match req.params.get("totalItems").and_then(|v| v.as_u64()) {
        Some(v) => v as usize,
        None => return bad_params(&req.id, "totalItems must be a non-negative integer"),
    };
    let page = match parse_positive(req.params.get("page"), "page") {
        Ok(v) => v.unwrap_or(1),
        Err(msg) => return bad_params(&req.id, msg),
    };
    let page_size = match parse_page_size(
        req,
        req.params.get("pageSize"),
        state.settings.view.max_page_size,
    ) {
        Ok(v) => v.unwrap_or(state.settings.view.default_page_size),
        Err(e) => return e,
    };
    let action = match req.params.get("action").filter(|v| !v.is_null()) {
        None => None,
        Some(v) => match v.as_str().and_then(PageAction::parse) {
            Some(a) => Some(a),
            None => return bad_params(&req.id, "action must be one of: first, prev, next, last"),
        },
    };

    let mut info = PageInfo::for_total(total_items, page, page_size);
    if let Some(action) = action {
        let target = action.apply(info.page, info.total_pages);
        info = PageInfo::for_total(total_items, target, page_size);
    }
    ok(&req.id, json!({ "pagination": info }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "view.open" => Some(handle_view_open(state, req)),
        "view.refresh" => Some(handle_view_refresh(state, req)),
        "view.get" => Some(handle_view_get(state, req)),
        "view.close" => Some(handle_view_close(state, req)),
        "view.setParams" => Some(handle_view_set_params(state, req)),
        "view.clearFilters" => Some(handle_view_clear_filters(state, req)),
        "view.setPage" => Some(handle_view_set_page(state, req)),
        "view.firstPage" => Some(handle_view_step_page(state, req, PageAction::First)),
        "view.prevPage" => Some(handle_view_step_page(state, req, PageAction::Prev)),
        "view.nextPage" => Some(handle_view_step_page(state, req, PageAction::Next)),
        "view.lastPage" => Some(handle_view_step_page(state, req, PageAction::Last)),
        "view.toggle" => Some(handle_view_toggle(state, req)),
        "view.toggleAll" => Some(handle_view_toggle_all(state, req)),
        "view.tagModal" => Some(handle_view_tag_modal(state, req)),
        "pagination.describe" => Some(handle_pagination_describe(state, req)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_click_flips_then_resets() {
        let current = SortSpec::default();
        let flipped = next_sort(current, Some(SortColumn::Name), None);
        assert_eq!(flipped.direction, SortDirection::Desc);
        let other = next_sort(flipped, Some(SortColumn::Credits), None);
        assert_eq!(other.column, SortColumn::Credits);
        assert_eq!(other.direction, SortDirection::Asc);
        let explicit = next_sort(other, None, Some(SortDirection::Desc));
        assert_eq!(explicit.column, SortColumn::Credits);
        assert_eq!(explicit.direction, SortDirection::Desc);
    }
}

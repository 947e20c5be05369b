use serde_json::json;

use crate::ipc::error::{bad_params, err, ok, ErrorCode};
use crate::ipc::helpers::{local_today, parse_date, parse_positive};
use crate::ipc::types::{AppState, Request};
use crate::recurrence::{next_occurrences, summarize, RecurrenceRule};

const MAX_PREVIEW: usize = 52;

fn handle_describe_recurrence(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("rule") else {
        return bad_params(&req.id, "missing rule");
    };
    let rule: RecurrenceRule = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, format!("rule is malformed: {}", e)),
    };
    if let Err(e) = rule.validate() {
        return err(
            &req.id,
            ErrorCode::BadParams,
            e.to_string(),
            Some(json!({ "rule": raw })),
        );
    }

    let preview = match parse_positive(req.params.get("preview"), "preview") {
        Ok(v) => v.unwrap_or(0).min(MAX_PREVIEW),
        Err(msg) => return bad_params(&req.id, msg),
    };
    let start = match parse_date(req.params.get("start"), "start") {
        Ok(v) => v.unwrap_or_else(local_today),
        Err(msg) => return bad_params(&req.id, msg),
    };
    let upcoming: Vec<String> = next_occurrences(&rule, start, preview)
        .into_iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    ok(
        &req.id,
        json!({
            "summary": summarize(&rule),
            "upcoming": upcoming
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lessons.describeRecurrence" => Some(handle_describe_recurrence(state, req)),
        _ => None,
    }
}

use chrono::NaiveDate;
use serde_json::json;

use crate::ipc::error::{bad_params, err, ErrorCode};
use crate::ipc::types::{AppState, Request};
use crate::view::ViewSession;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| bad_params(&req.id, format!("missing {}", key)))
}

pub fn parse_bool(v: Option<&serde_json::Value>, default: bool) -> Result<bool, String> {
    match v {
        None => Ok(default),
        Some(serde_json::Value::Null) => Ok(default),
        Some(serde_json::Value::Bool(b)) => Ok(*b),
        Some(_) => Err("must be a boolean".to_string()),
    }
}

pub fn parse_positive(v: Option<&serde_json::Value>, field: &str) -> Result<Option<usize>, String> {
    let Some(value) = v else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    match value.as_u64() {
        Some(n) if n >= 1 => Ok(Some(n as usize)),
        _ => Err(format!("{} must be a positive integer", field)),
    }
}

pub fn parse_date(v: Option<&serde_json::Value>, field: &str) -> Result<Option<NaiveDate>, String> {
    let Some(value) = v else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let Some(raw) = value.as_str() else {
        return Err(format!("{} must be a YYYY-MM-DD string", field));
    };
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("{} must be a YYYY-MM-DD string", field))
}

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn view_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut ViewSession, serde_json::Value> {
    let view_id = required_str(req, "viewId")?;
    state.views.get_mut(&view_id).ok_or_else(|| {
        err(
            &req.id,
            ErrorCode::NotFound,
            "view not found",
            Some(json!({ "viewId": view_id })),
        )
    })
}

//! Reply envelopes: `{id, ok: true, result}` or
//! `{id, ok: false, error: {code, message, details?}}`.

use serde_json::json;

use crate::store::StoreError;

/// Stable `error.code` values the UI switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadParams,
    NotFound,
    Conflict,
    ValidationFailed,
    NotImplemented,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadParams => "bad_params",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::ValidationFailed => "validation_failed",
            ErrorCode::NotImplemented => "not_implemented",
        }
    }
}

impl From<&StoreError> for ErrorCode {
    fn from(e: &StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ErrorCode::NotFound,
            StoreError::Duplicate { .. } => ErrorCode::Conflict,
        }
    }
}

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: ErrorCode,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code.as_str(),
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn bad_params(id: &str, message: impl Into<String>) -> serde_json::Value {
    err(id, ErrorCode::BadParams, message, None)
}

pub fn store_err(id: &str, e: StoreError) -> serde_json::Value {
    let details = match &e {
        StoreError::NotFound { id: student_id } | StoreError::Duplicate { id: student_id } => {
            json!({ "studentId": student_id })
        }
    };
    err(id, ErrorCode::from(&e), e.to_string(), Some(details))
}

use serde_json::json;
use tracing::info;

use crate::ipc::error::{bad_params, err, ok, store_err, ErrorCode};
use crate::ipc::helpers::{local_today, parse_date, required_str};
use crate::ipc::types::{AppState, Request};
use crate::validate::{apply_patch, validate_student_form, FieldErrors, StudentForm};

fn validation_failed(req: &Request, errors: FieldErrors) -> serde_json::Value {
    err(
        &req.id,
        ErrorCode::ValidationFailed,
        "form has invalid fields",
        Some(json!({ "fieldErrors": errors })),
    )
}

fn parse_form(req: &Request, key: &str) -> Result<StudentForm, serde_json::Value> {
    let Some(raw) = req.params.get(key) else {
        return Err(bad_params(&req.id, format!("missing {}", key)));
    };
    serde_json::from_value::<StudentForm>(raw.clone())
        .map_err(|e| bad_params(&req.id, format!("{} is malformed: {}", key, e)))
}

/// Validation runs against the caller's date when given, so tests can pin it.
fn request_today(req: &Request) -> Result<chrono::NaiveDate, serde_json::Value> {
    match parse_date(req.params.get("today"), "today") {
        Ok(v) => Ok(v.unwrap_or_else(local_today)),
        Err(msg) => Err(bad_params(&req.id, msg)),
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.store.fetch_all() {
        Ok(students) => ok(
            &req.id,
            json!({ "students": students, "count": students.len() }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.fetch_by_id(&student_id) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let form = match parse_form(req, "form") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let today = match request_today(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let draft = match validate_student_form(&form, today) {
        Ok(v) => v,
        Err(errors) => return validation_failed(req, errors),
    };
    match state.store.create(draft) {
        Ok(student) => {
            info!(student_id = %student.id, "student added");
            ok(
                &req.id,
                json!({ "studentId": student.id, "student": student }),
            )
        }
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch = match parse_form(req, "patch") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let today = match request_today(req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let existing = match state.store.fetch_by_id(&student_id) {
        Ok(v) => v,
        Err(e) => return store_err(&req.id, e),
    };
    let updated = match apply_patch(&existing, &patch, today) {
        Ok(v) => v,
        Err(errors) => return validation_failed(req, errors),
    };
    match state.store.persist_edit(updated) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        _ => None,
    }
}

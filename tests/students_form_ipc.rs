use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_tutord");
    let mut child = Command::new(exe)
        .env_remove("TUTORD_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn tutord");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn student_count(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, id: &str) -> u64 {
    request_ok(stdin, reader, id, "students.list", json!({}))
        .get("count")
        .and_then(|v| v.as_u64())
        .expect("count")
}

#[test]
fn invalid_form_never_reaches_the_store() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    assert_eq!(student_count(&mut stdin, &mut reader, "1"), 8);

    let raw = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({
            "today": "2026-10-15",
            "form": { "firstName": " ", "email": "not-an-email" }
        }),
    );
    assert_eq!(raw["ok"], false);
    assert_eq!(raw["error"]["code"], "validation_failed");
    let field_errors = &raw["error"]["details"]["fieldErrors"];
    assert!(field_errors.get("firstName").is_some());
    assert!(field_errors.get("lastName").is_some());
    assert!(field_errors.get("email").is_some());

    assert_eq!(student_count(&mut stdin, &mut reader, "3"), 8);
}

#[test]
fn created_student_shows_up_after_refresh() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "view.open",
        json!({ "today": "2026-10-15" }),
    );
    let view_id = opened["view"]["viewId"].as_str().expect("viewId").to_string();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({
            "today": "2026-10-15",
            "form": {
                "firstName": "Kai",
                "lastName": "Lee",
                "kind": "child",
                "birthDate": "2016-04-01",
                "familyName": "Lee Family",
                "guardianName": "Min Lee",
                "guardianPhone": "555-0188",
                "status": "trial",
                "tags": ["Chess"]
            }
        }),
    );
    let student_id = created["studentId"].as_str().expect("studentId").to_string();
    assert_eq!(created["student"]["profile"]["kind"], "child");
    assert_eq!(created["student"]["credits"], 0);

    // The open view keeps its snapshot until refreshed.
    let stale = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "view.get",
        json!({ "viewId": view_id }),
    );
    assert_eq!(stale["view"]["totalCount"], 8);

    let fresh = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "view.refresh",
        json!({ "viewId": view_id }),
    );
    assert_eq!(fresh["view"]["totalCount"], 9);
    assert_eq!(fresh["view"]["statusCounts"][1]["count"], 2);

    let filtered = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "view.setParams",
        json!({ "viewId": view_id, "search": "lee family" }),
    );
    let rows = filtered["view"]["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], student_id.as_str());
    assert_eq!(rows[0]["age"], 10);
}

#[test]
fn update_merges_patch_and_revalidates() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.update",
        json!({
            "studentId": "stu-004",
            "patch": { "status": "active", "credits": 5 }
        }),
    );
    assert_eq!(updated["student"]["status"], "active");
    assert_eq!(updated["student"]["credits"], 5);
    assert_eq!(updated["student"]["profile"]["family"]["id"], "fam-002");

    let rejected = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.update",
        json!({ "studentId": "stu-003", "patch": { "email": "sophia@" } }),
    );
    assert_eq!(rejected["error"]["code"], "validation_failed");

    let unchanged = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.get",
        json!({ "studentId": "stu-003" }),
    );
    assert_eq!(
        unchanged["student"]["email"],
        "sophia.martinez@example.com"
    );

    let missing = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.update",
        json!({ "studentId": "stu-404", "patch": {} }),
    );
    assert_eq!(missing["error"]["code"], "not_found");
}

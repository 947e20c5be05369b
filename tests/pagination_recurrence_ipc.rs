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
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

#[test]
fn pagination_describe_clamps_and_steps() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "pagination.describe",
        json!({ "totalItems": 247, "page": 1, "pageSize": 25 }),
    );
    let info = &resp["result"]["pagination"];
    assert_eq!(info["totalPages"], 10);
    assert_eq!(info["label"], "Showing 1-25 of 247");
    assert_eq!(info["hasPrev"], false);

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "pagination.describe",
        json!({ "totalItems": 247, "page": 10, "pageSize": 25, "action": "next" }),
    );
    let info = &resp["result"]["pagination"];
    assert_eq!(info["page"], 10);
    assert_eq!(info["label"], "Showing 226-247 of 247");
    assert_eq!(info["hasNext"], false);

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "pagination.describe",
        json!({ "totalItems": 247, "page": 40, "pageSize": 25, "action": "prev" }),
    );
    assert_eq!(resp["result"]["pagination"]["page"], 9);

    let resp = request(
        &mut stdin,
        &mut reader,
        "4",
        "pagination.describe",
        json!({ "totalItems": 0, "pageSize": 25 }),
    );
    let info = &resp["result"]["pagination"];
    assert_eq!(info["totalPages"], 1);
    assert_eq!(info["label"], "No results");

    let bad = request(
        &mut stdin,
        &mut reader,
        "5",
        "pagination.describe",
        json!({ "totalItems": 10, "action": "sideways" }),
    );
    assert_eq!(bad["error"]["code"], "bad_params");
}

#[test]
fn recurrence_summary_and_preview() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "lessons.describeRecurrence",
        json!({
            "rule": { "frequency": "weekly", "weekdays": ["Thu", "Tue"], "count": 3 },
            "start": "2026-10-15",
            "preview": 5
        }),
    );
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["result"]["summary"], "Every week on Tue, Thu, 3 times");
    assert_eq!(
        resp["result"]["upcoming"],
        json!(["2026-10-15", "2026-10-20", "2026-10-22"])
    );

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "lessons.describeRecurrence",
        json!({
            "rule": { "frequency": "daily", "interval": 2, "until": "2026-10-20" },
            "start": "2026-10-15",
            "preview": 10
        }),
    );
    assert_eq!(resp["result"]["summary"], "Every 2 days until 2026-10-20");
    assert_eq!(
        resp["result"]["upcoming"],
        json!(["2026-10-15", "2026-10-17", "2026-10-19"])
    );

    let bad = request(
        &mut stdin,
        &mut reader,
        "3",
        "lessons.describeRecurrence",
        json!({ "rule": { "frequency": "monthly", "weekdays": ["Mon"] } }),
    );
    assert_eq!(bad["error"]["code"], "bad_params");
}

#[test]
fn huge_interval_preview_keeps_sidecar_alive() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    for (i, frequency) in ["daily", "weekly", "monthly"].iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("r{}", i),
            "lessons.describeRecurrence",
            json!({
                "rule": { "frequency": frequency, "interval": 4_000_000_000u64 },
                "start": "2026-10-15",
                "preview": 2
            }),
        );
        assert_eq!(resp["ok"], true, "{}: {}", frequency, resp);
        assert_eq!(resp["result"]["upcoming"], json!(["2026-10-15"]));
    }

    let health = request(&mut stdin, &mut reader, "h", "health", json!({}));
    assert_eq!(health["ok"], true);
    assert_eq!(health["result"]["studentCount"], 8);
}

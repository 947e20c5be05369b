mod config;
mod ipc;
mod logging;
mod recurrence;
mod roster;
mod store;
mod validate;
mod view;

use std::io::{self, BufRead, Write};

use serde_json::json;
use tracing::{info, warn};

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("tutord: logging disabled: {e:#}");
    }

    let settings = config::load_settings();
    let mut state = ipc::AppState::new(settings);
    info!(students = state.store.len(), "store ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                warn!("stdin closed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo back.
                warn!("bad request line: {}", e);
                let _ = writeln!(
                    stdout,
                    "{}",
                    json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("tutord exiting");
}

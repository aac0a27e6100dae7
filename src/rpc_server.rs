//! SecurePass RPC Server: JSON-RPC over stdin/stdout for a host UI shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"credential.add", "params":{"account_type":"...",...}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use securepass::app::App;
use securepass::logging::init_logging;
use securepass::rpc_handler::handle_method;
use securepass::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn emit(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() -> ExitCode {
    let mut engine = SettingsEngine::new(std::env::var("SECUREPASS_CONFIG").ok());
    let loaded = engine.load();
    init_logging(&engine.get_settings().logging.level);
    if let Err(e) = loaded {
        warn!(error = %e, path = engine.get_config_path(), "settings unreadable, using defaults");
    }

    if let Ok(dir) = std::env::var("SECUREPASS_DATA_DIR") {
        engine.override_data_dir(dir);
    }
    let data_dir = engine.data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        error!(error = %e, dir = %data_dir.display(), "cannot create data directory");
        return ExitCode::FAILURE;
    }
    let db_path = engine.database_path();
    let settings = engine.get_settings();

    let mut app = match App::from_settings(&db_path, settings) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to initialize SecurePass");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = app.startup() {
        warn!(error = %e, "vault stays locked until auth.unlock succeeds");
    }
    // Without an embedded prompt the host shows its own and reports the
    // outcome through `auth.unlock {"result": ...}`.
    let app = Mutex::new(app);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Signal ready
    let ready = json!({"event":"ready","version":env!("CARGO_PKG_VERSION")});
    if emit(&mut out, &ready).is_err() {
        return ExitCode::FAILURE;
    }

    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => json!({"id":null,"error":format!("parse error: {}",e)}),
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                if !rate_limiter.check() {
                    json!({"id": id, "error": "rate limit exceeded"})
                } else {
                    let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                    let params = req.get("params").cloned().unwrap_or(json!({}));
                    match handle_method(&app, method, &params) {
                        Ok(val) => json!({"id": id, "result": val}),
                        Err(err) => json!({"id": id, "error": err}),
                    }
                }
            }
        };
        if emit(&mut out, &response).is_err() {
            break;
        }
    }

    info!("stdin closed");
    let app = app.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Err(e) = app.close() {
        error!(error = %e, "failed to close credential database");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

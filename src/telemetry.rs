use crate::config::AppConfig;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;

static TRACING_INIT: OnceLock<()> = OnceLock::new();
static PANIC_HOOK_INIT: OnceLock<()> = OnceLock::new();

/// Default JSON trace location when `--log-file` is not given.
pub fn tracing_log_path(config: &AppConfig) -> PathBuf {
    config
        .log_file
        .clone()
        .unwrap_or_else(|| env::temp_dir().join("emuface_trace.jsonl"))
}

/// Path to the crash log file.
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("emuface_crash.log")
}

/// Install the global subscriber: console output at `--log-level`, plus an
/// optional JSON file layer. Safe to call more than once.
pub fn init_tracing(config: &AppConfig) {
    if config.no_logs {
        return;
    }

    let _ = TRACING_INIT.get_or_init(|| {
        let console = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(UtcTime::rfc_3339())
            .with_filter(LevelFilter::from_level(config.log_level.as_tracing()));

        let json = if config.logs {
            let path = tracing_log_path(config);
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => Some(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_timer(UtcTime::rfc_3339())
                        .with_writer(Mutex::new(file))
                        .with_current_span(false)
                        .with_span_list(false),
                ),
                Err(err) => {
                    eprintln!("emuface: cannot open trace log {}: {err}", path.display());
                    None
                }
            }
        } else {
            None
        };

        let _ = tracing_subscriber::registry()
            .with(console)
            .with(json)
            .try_init();
    });
}

/// Record panics to a small crash log before handing off to the default hook.
pub fn install_panic_hook() {
    let _ = PANIC_HOOK_INIT.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            write_crash_line(&crash_line(info));
            previous(info);
        }));
    });
}

fn crash_line(info: &panic::PanicHookInfo<'_>) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    };
    format!(
        "[{timestamp}] panic at {location}: {payload} (v{})\n",
        env!("CARGO_PKG_VERSION")
    )
}

fn write_crash_line(line: &str) {
    let path = crash_log_path();
    let existing = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let truncate = existing.saturating_add(line.len() as u64) > CRASH_LOG_MAX_BYTES;
    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    if let Ok(mut file) = options.open(&path) {
        let _ = file.write_all(line.as_bytes());
    }
}

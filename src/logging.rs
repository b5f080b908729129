//! Structured logging for the privileged shell process.
//!
//! Dual-output setup:
//! - **JSONL to file** (`<data_dir>/jsui/logs/jsui-shell.jsonl`) for tooling
//! - **Pretty to stderr** for developers
//!
//! ```rust,ignore
//! // Keep the guard alive for the duration of the program.
//! let _guard = jsui_shell::logging::init();
//! tracing::info!(channel = "open-dialog", "request dispatched");
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard that must be kept alive for the duration of the program.
/// Dropping it flushes and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// `filter` overrides the default `info` level; `RUST_LOG` wins over both.
pub fn init(filter: Option<&str>) -> LoggingGuard {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[jsui-shell] failed to create log directory: {}", e);
    }

    let path = log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .unwrap_or_else(|e| {
            eprintln!("[jsui-shell] failed to open log file: {}", e);
            OpenOptions::new()
                .write(true)
                .open("/dev/null")
                .expect("failed to open /dev/null")
        });

    // Non-blocking writer so slow disks never stall command dispatch.
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or("info")));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %path.display(),
        "Shell logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("jsui").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("jsui-logs"))
}

/// Path of the JSONL log file.
pub fn log_path() -> PathBuf {
    log_dir().join("jsui-shell.jsonl")
}

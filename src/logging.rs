//! Tracing configuration and log routing.
//!
//! The server logs to stdout using a compact formatter and appends to a log file. When
//! `DOC_INTAKE_LOG_FILE` is set, that path is used verbatim; otherwise a daily rolling file is
//! created under `DOC_INTAKE_LOG_DIR` (default `logs/`). The CLI logs to stderr only so that its
//! stdout stays machine-readable.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "doc-intake.log";

/// Configure tracing subscribers for the HTTP server.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Installs a compact stdout layer and, when available, a file layer.
/// - Keeps the non‑blocking writer guard alive for the process lifetime.
pub fn init_tracing() {
    let stdout_layer = fmt::layer().with_target(false).compact();
    let registry = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stdout_layer);

    match configure_file_writer() {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

/// Configure a stderr-only subscriber for command-line tools (defaults to `warn`).
pub fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Where the file layer writes.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget {
    /// Append to this exact path.
    File(PathBuf),
    /// Roll daily inside this directory as `doc-intake.log.YYYY-MM-DD`.
    DailyIn(PathBuf),
}

fn log_target(file: Option<String>, directory: Option<String>) -> LogTarget {
    match file.filter(|path| !path.trim().is_empty()) {
        Some(path) => LogTarget::File(PathBuf::from(path)),
        None => LogTarget::DailyIn(PathBuf::from(
            directory
                .filter(|dir| !dir.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
        )),
    }
}

/// Build a non‑blocking writer for file logging.
///
/// Returns `None` when the log directory cannot be created or the target file cannot be opened;
/// stdout logging continues in that case.
fn configure_file_writer() -> Option<NonBlocking> {
    let target = log_target(
        std::env::var("DOC_INTAKE_LOG_FILE").ok(),
        std::env::var("DOC_INTAKE_LOG_DIR").ok(),
    );
    match target {
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .inspect_err(|err| eprintln!("Failed to open log file {}: {err}", path.display()))
                .ok()?;
            Some(install_writer(tracing_appender::non_blocking(file)))
        }
        LogTarget::DailyIn(directory) => {
            if let Err(err) = std::fs::create_dir_all(&directory) {
                eprintln!("Failed to create log directory {}: {err}", directory.display());
                return None;
            }
            let appender = tracing_appender::rolling::daily(&directory, LOG_FILE_PREFIX);
            Some(install_writer(tracing_appender::non_blocking(appender)))
        }
    }
}

fn install_writer((writer, guard): (NonBlocking, WorkerGuard)) -> NonBlocking {
    let _ = LOG_GUARD.set(guard);
    writer
}

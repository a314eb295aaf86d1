//! Telemetry
//!
//! Structured logging setup. CLI commands log to stderr; the terminal UI
//! owns the screen, so it logs to a file instead. Levels come from
//! `RUST_LOG` and default to `warn`.

use std::path::Path;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Name of the log file written in TUI mode.
pub const LOG_FILE_NAME: &str = "codeflux.log";

static INIT: Once = Once::new();

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize global tracing to stderr.
///
/// `quiet` lowers the default to errors only; an explicit `RUST_LOG` wins.
pub fn init_tracing(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    INIT.call_once(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(true)
            .compact()
            .with_writer(std::io::stderr); // stdout carries command output

        let _ = tracing_subscriber::registry()
            .with(env_filter(default))
            .with(fmt_layer)
            .try_init();
    });
}

/// Initialize global tracing to `<dir>/codeflux.log`.
///
/// Keep the returned guard alive for as long as logging should flush.
/// Returns `None` if the directory cannot be created or tracing is already set.
pub fn init_file_tracing(dir: &Path) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }
    let mut guard = None;
    INIT.call_once(|| {
        let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
        let (writer, worker) = tracing_appender::non_blocking(appender);
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer);

        if tracing_subscriber::registry()
            .with(env_filter("info"))
            .with(fmt_layer)
            .try_init()
            .is_ok()
        {
            guard = Some(worker);
        }
    });
    guard
}

/// Sanitize a string for safe log output by escaping control characters.
/// Learner-typed text (notes, tutor questions) goes through here first.
pub fn sanitize_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\x00' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Shorten free text for a log line, keeping it on one line.
pub fn preview_for_log(s: &str, max_chars: usize) -> String {
    let clean = sanitize_for_log(s);
    if clean.chars().count() <= max_chars {
        return clean;
    }
    let mut cut: String = clean.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

/// Initialize tracing for tests with a simple subscriber
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

//! Logger module
//!
//! Provides logging utilities for the routing core including:
//! - Leveled error/warning/info/debug output
//! - Routing and dispatch events
//! - Access logging with multiple formats
//! - File-based logging support

mod format;
mod level;
pub mod writer;

pub use format::AccessLogEntry;
pub use level::LogLevel;

use crate::config::LoggingConfig;
use crate::http::Method;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Until then messages go
/// to stdout/stderr at the default level.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let level = config.level.parse::<LogLevel>().unwrap_or_else(|_| {
        eprintln!("[WARN] Unknown log level {:?}, using info", config.level);
        LogLevel::default()
    });
    writer::init(
        level,
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

fn enabled(level: LogLevel) -> bool {
    let threshold = if writer::is_initialized() {
        writer::get().level()
    } else {
        LogLevel::default()
    };
    level <= threshold
}

/// Write to info log
fn write_info(level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(level: LogLevel, message: &str) {
    if !enabled(level) {
        return;
    }
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

pub fn log_error(message: &str) {
    write_error(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(LogLevel::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    write_info(LogLevel::Info, &format!("[INFO] {message}"));
}

pub fn log_debug(message: &str) {
    write_info(LogLevel::Debug, &format!("[DEBUG] {message}"));
}

pub fn log_route_matched(method: Method, path: &str, pattern: &str, handler: &str) {
    log_debug(&format!("[Route] {method} {path} matched {pattern:?} -> {handler}"));
}

pub fn log_no_route(method: Method, path: &str) {
    log_info(&format!("[Route] No route for {method} {path}"));
}

pub fn log_handler_failed(handler: &str, message: &str) {
    log_error(&format!("[Handler] {handler} failed: {message}"));
}

pub fn log_handler_panicked(handler: &str, message: &str) {
    log_error(&format!("[Handler] {handler} panicked: {message}"));
}

pub fn log_invalid_request(method: &str, path: &str, reason: &str) {
    log_warning(&format!("Rejected {method} {path}: {reason}"));
}

pub fn log_status_coerced(status: u16) {
    log_warning(&format!("Unrecognized status {status}, sending 500"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    if writer::is_initialized() {
        writer::get().write_access(&line);
    } else {
        println!("{line}");
    }
}

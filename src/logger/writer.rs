//! Log writer module
//!
//! Thread-safe sinks for the access/info stream and the error stream, each
//! either a standard stream or an append-mode file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use super::LogLevel;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum Sink {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl Sink {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(path) => Ok(Self::File(Mutex::new(open_log_file(path)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Leveled writer with separate access and error sinks
pub struct LogWriter {
    level: LogLevel,
    access: Sink,
    error: Sink,
}

impl LogWriter {
    /// Create a writer, opening any configured log files
    pub fn new(
        level: LogLevel,
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
    ) -> io::Result<Self> {
        Ok(Self {
            level,
            access: Sink::open(access_log_file, Sink::Stdout)?,
            error: Sink::open(error_log_file, Sink::Stderr)?,
        })
    }

    pub const fn level(&self) -> LogLevel {
        self.level
    }

    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    /// Info and debug messages share the access sink
    pub fn write_info(&self, message: &str) {
        self.access.write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Returns an error if log files cannot be opened or the writer is
/// already installed.
pub fn init(
    level: LogLevel,
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
) -> io::Result<()> {
    let writer = LogWriter::new(level, access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer
///
/// Panics if `init()` has not been called; check [`is_initialized`] first.
pub fn get() -> &'static LogWriter {
    LOG_WRITER
        .get()
        .expect("Log writer not initialized. Call logger::writer::init() first.")
}

/// Check if the log writer has been initialized
pub fn is_initialized() -> bool {
    LOG_WRITER.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_log_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mnml-writer-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_file_sinks_append() {
        let dir = temp_log_dir("append");
        let access = dir.join("nested/access.log");
        let error = dir.join("error.log");
        let access_path = access.to_str().unwrap();
        let error_path = error.to_str().unwrap();

        let writer = LogWriter::new(LogLevel::Debug, Some(access_path), Some(error_path)).unwrap();
        writer.write_access("GET /ping 200");
        writer.write_info("[INFO] started");
        writer.write_error("[ERROR] boom");
        drop(writer);

        let access_log = std::fs::read_to_string(&access).unwrap();
        assert_eq!(access_log, "GET /ping 200\n[INFO] started\n");
        let error_log = std::fs::read_to_string(&error).unwrap();
        assert_eq!(error_log, "[ERROR] boom\n");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_default_sinks() {
        let writer = LogWriter::new(LogLevel::Warn, None, None).unwrap();
        assert_eq!(writer.level(), LogLevel::Warn);
        assert!(matches!(writer.access, Sink::Stdout));
        assert!(matches!(writer.error, Sink::Stderr));
    }
}

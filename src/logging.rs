//! Logging configuration for db-chat.
//!
//! Logs go to stderr by default, or to a file when one is configured.

use std::fs::{self, File};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes the global tracing subscriber.
///
/// With `file` set, logs are appended to that file without ANSI colors. If
/// the file cannot be opened, a warning is printed and stderr is used.
pub fn init_logging(file: Option<&Path>) {
    if let Some(path) = file {
        match open_log_file(path) {
            Ok(log_file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter())
                    .with_writer(log_file)
                    .with_ansi(false)
                    .init();
                return;
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not open log file {}: {e}",
                    path.display()
                );
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the log file for appending, creating its parent directory.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}

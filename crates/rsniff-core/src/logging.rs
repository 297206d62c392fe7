//! Debug logging for analysis runs
//!
//! Provides detailed logging of configuration loading, sniff dispatch,
//! and fix passes for debugging and verification purposes.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Global logger instance
static LOGGER: Mutex<Option<DebugLogger>> = Mutex::new(None);

/// Logger for analysis runs
pub struct DebugLogger {
    file: File,
}

impl DebugLogger {
    /// Create a new logger writing to the specified path
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;

        Ok(Self { file })
    }

    /// Write a log message
    pub fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }

    /// Log a section header
    pub fn section(&mut self, title: &str) {
        let separator = "=".repeat(60);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }
}

/// Initialize the global logger
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = log_path.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!("/tmp/rsniff-{}.log", timestamp))
    });

    let logger = DebugLogger::new(&path)?;

    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }

    Ok(path)
}

/// Log a message to the global logger
pub fn log(message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(message);
        }
    }
}

/// Log a section header
pub fn section(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.section(title);
        }
    }
}

/// Check if logging is enabled
pub fn is_enabled() -> bool {
    if let Ok(guard) = LOGGER.lock() {
        guard.is_some()
    } else {
        false
    }
}

/// Log configuration loading
pub fn log_config_load(path: &Path) {
    section("CONFIGURATION LOADING");
    log(&format!("Loading config from: {}", path.display()));
}

/// Log run start
pub fn log_run_start(files_count: usize, sniffs_count: usize) {
    section("RUN START");
    log(&format!("Files to check: {}", files_count));
    log(&format!("Active sniffs: {}", sniffs_count));
}

/// Log per-file result
pub fn log_file_result(path: &Path, errors: usize, warnings: usize) {
    log(&format!(
        "{}: {} errors, {} warnings",
        path.display(),
        errors,
        warnings
    ));
}

/// Log fix passes for one file
pub fn log_fix_result(path: &Path, passes: usize, converged: bool) {
    if converged {
        log(&format!(
            "{}: fixed after {} pass(es)",
            path.display(),
            passes
        ));
    } else {
        log(&format!(
            "{}: fixer did NOT converge after {} passes",
            path.display(),
            passes
        ));
    }
}

/// Log run complete
pub fn log_run_complete(total_errors: usize, total_warnings: usize, failed_files: usize) {
    section("RUN COMPLETE");
    log(&format!("Total errors: {}", total_errors));
    log(&format!("Total warnings: {}", total_warnings));
    log(&format!("Files that could not be read: {}", failed_files));
}

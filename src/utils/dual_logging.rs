use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use tracing::Level;

use crate::utils::app_paths::AppPaths;
use crate::utils::logging::LogEntry;

/// Set to echo every log line to stderr (suspended while the TUI owns the screen)
pub const DEBUG_ENV: &str = "CITY_SEARCH_DEBUG";

/// Global dual logger instance
static DUAL_LOGGER: OnceLock<Option<DualLogger>> = OnceLock::new();

/// Appends log entries to a timestamped file
pub struct DualLogger {
    log_file: Mutex<File>,
    log_path: PathBuf,
    echo_stderr: AtomicBool,
}

impl DualLogger {
    pub fn new(log_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("city-search_{}.log", timestamp));

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        #[cfg(unix)]
        {
            let latest_path = log_dir.join("latest.log");
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        Ok(Self {
            log_file: Mutex::new(log_file),
            log_path,
            echo_stderr: AtomicBool::new(std::env::var(DEBUG_ENV).is_ok()),
        })
    }

    pub fn log(&self, level: Level, target: &str, message: &str) {
        let entry = LogEntry::new(level, target, message.to_string());

        if let Ok(mut file) = self.log_file.lock() {
            let _ = writeln!(file, "{}", entry.format_for_display());
            let _ = file.flush(); // keep the tail usable after a crash
        }

        if self.echo_stderr.load(Ordering::Relaxed) {
            eprintln!("{}", entry.format_for_display());
        }
    }

    pub fn echoes_to_stderr(&self) -> bool {
        self.echo_stderr.load(Ordering::Relaxed)
    }

    /// Turn the stderr echo off until the guard drops
    pub fn suspend_echo(&self) -> StderrEchoGuard<'_> {
        StderrEchoGuard {
            logger: Some(self),
            previous: self.echo_stderr.swap(false, Ordering::Relaxed),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = file.flush();
        }
    }
}

/// Initialize the global dual logger. `None` when no log file could be opened.
pub fn init_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER
        .get_or_init(|| {
            let dir = AppPaths::log_dir().ok()?;
            DualLogger::new(&dir).ok()
        })
        .as_ref()
}

/// Restores the stderr echo setting on drop
#[must_use = "the echo comes back as soon as the guard is dropped"]
pub struct StderrEchoGuard<'a> {
    logger: Option<&'a DualLogger>,
    previous: bool,
}

impl Drop for StderrEchoGuard<'_> {
    fn drop(&mut self) {
        if let Some(logger) = self.logger {
            logger.echo_stderr.store(self.previous, Ordering::Relaxed);
        }
    }
}

/// Suspend the global logger's stderr echo, if there is a global logger
pub fn suspend_stderr_echo() -> StderrEchoGuard<'static> {
    match get_dual_logger() {
        Some(logger) => logger.suspend_echo(),
        None => StderrEchoGuard {
            logger: None,
            previous: false,
        },
    }
}

/// Get the global dual logger
pub fn get_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER.get().and_then(Option::as_ref)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_lines_land_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let logger = DualLogger::new(dir.path()).unwrap();

        logger.log(Level::ERROR, "fetch", "Error fetching cities: timeout");
        logger.flush();

        let contents = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(contents.contains("ERROR [fetch] Error fetching cities: timeout"));
    }

    #[test]
    fn test_echo_suspended_while_guard_lives() {
        let dir = tempfile::tempdir().unwrap();
        let logger = DualLogger::new(dir.path()).unwrap();
        logger.echo_stderr.store(true, Ordering::Relaxed);

        {
            let _echo = logger.suspend_echo();
            assert!(!logger.echoes_to_stderr());
            logger.log(Level::INFO, "input", "key while the TUI is up");
        }
        assert!(logger.echoes_to_stderr());

        // lines still reach the file while the echo is off
        let contents = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(contents.contains("key while the TUI is up"));
    }
}

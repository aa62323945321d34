//! Session logger: backs the `log` facade with a single file in the OS data
//! directory.
//!
//! The file is **truncated at each launch**, so it only ever holds output
//! from the most recent session.
//!
//! Log location (via `directories::ProjectDirs`):
//!   Windows:  `%APPDATA%\TilePaint\data\tilepaint.log`
//!   Linux:    `~/.local/share/tilepaint/tilepaint.log`
//!   macOS:    `~/Library/Application Support/TilePaint/tilepaint.log`
//!
//! Anywhere in the crate use `log::info!` / `log::warn!` / `log::error!` /
//! `log::debug!`. Panics are mirrored into the file by a panic hook.

use directories::ProjectDirs;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Returns the path to the current session log file.
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// `log::Log` backend writing `[HH:MM:SS] [LEVEL] message` lines.
pub struct SessionLogger {
    file: Option<Mutex<File>>,
    /// Echo warnings and errors to stderr (CLI runs).
    echo_stderr: bool,
}

impl SessionLogger {
    fn write_line(&self, line: &str) {
        if let Some(mutex) = &self.file
            && let Ok(mut file) = mutex.lock()
        {
            let _ = writeln!(file, "{}", line);
        }
    }
}

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] [{}] {}", timestamp(), record.level(), record.args());
        self.write_line(&line);
        if self.echo_stderr && record.level() <= Level::Warn {
            eprintln!("{}", line);
        }
    }

    fn flush(&self) {
        if let Some(mutex) = &self.file
            && let Ok(mut file) = mutex.lock()
        {
            let _ = file.flush();
        }
    }
}

/// Initialise the session logger. Call once, before any logging.
///
/// * Creates (or truncates) the log file. Failing to open it is not fatal;
///   the logger then only echoes to stderr.
/// * Installs a panic hook that writes the panic message to the log before
///   running the default handler.
pub fn init(level: LevelFilter, echo_stderr: bool) {
    let path = log_file_path();
    let file = path.as_deref().and_then(open_truncated);
    if let (Some(path), Some(_)) = (&path, &file) {
        let _ = LOG_PATH.set(path.clone());
    }

    let logger = SessionLogger {
        file: file.map(Mutex::new),
        echo_stderr,
    };
    if log::set_boxed_logger(Box::new(logger)).is_err() {
        // Already installed (tests, or a second init).
        return;
    }
    log::set_max_level(level);

    log::info!("=== TilePaint session started {} ===", human_timestamp());
    if let Some(path) = log_path() {
        log::info!("Log file: {}", path.display());
    }

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log::error!("PANIC: {}", info);
        log::logger().flush();
        prev(info);
    }));
}

fn open_truncated(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).write(true).truncate(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            None
        }
    }
}

fn log_file_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "TilePaint").map(|dirs| dirs.data_dir().join("tilepaint.log"))
}

/// `HH:MM:SS` within the current UTC day.
fn timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => {
            let secs = d.as_secs();
            let h = (secs % 86400) / 3600;
            let m = (secs % 3600) / 60;
            let s = secs % 60;
            format!("{:02}:{:02}:{:02}", h, m, s)
        }
        Err(_) => "??:??:??".to_string(),
    }
}

/// Date-time for the session header.
fn human_timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => format!("(unix {})", d.as_secs()),
        Err(_) => "(unknown time)".to_string(),
    }
}

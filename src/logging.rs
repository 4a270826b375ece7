//! Logging setup for the host.
//!
//! Installs `env_logger` behind the `log` facade. Lines go to stderr and,
//! unless disabled, are also appended to a daily log file with automatic
//! cleanup of old files.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use env_logger::{Builder, Env, Target};

use crate::config::APP_DIR_NAME;

/// Maximum number of log files to keep
const MAX_LOG_FILES: usize = 5;

/// Default filter when neither `--log-level` nor `RUST_LOG` is set
const DEFAULT_FILTER: &str = "info";

/// Writes every line to stderr and to the current log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

/// `<data_local_dir>/mascot-host/logs`
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME).join("logs"))
}

/// Get the path for the current log file (one per day)
pub fn current_log_path(log_dir: &Path) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d");
    log_dir.join(format!("{}_{}.log", APP_DIR_NAME, date))
}

/// Clean up old log files, keeping only the most recent `keep`.
///
/// Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "log")
                .unwrap_or(false)
        })
        .collect();

    // Newest first; the date-stamped name breaks ties between same-mtime files
    log_files.sort_by(|a, b| {
        let a_time = a.metadata().and_then(|m| m.modified()).ok();
        let b_time = b.metadata().and_then(|m| m.modified()).ok();
        b_time.cmp(&a_time).then_with(|| b.file_name().cmp(&a.file_name()))
    });

    let mut removed = 0;
    for file in log_files.into_iter().skip(keep) {
        if fs::remove_file(file.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}

/// Open (or create) today's log file inside `log_dir`.
fn open_log_file(log_dir: &Path) -> io::Result<(File, PathBuf)> {
    fs::create_dir_all(log_dir)?;
    let path = current_log_path(log_dir);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Initialize logging.
///
/// `filter` takes precedence over `RUST_LOG`. When `log_dir` is `Some`, output
/// is teed into a daily file there; if the file cannot be opened we fall back
/// to stderr only. Returns the log file path in use, if any.
///
/// Calling this twice is harmless: the second call leaves the first logger
/// installed.
pub fn init_logging(filter: Option<&str>, log_dir: Option<&Path>) -> Option<PathBuf> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    let mut file_error = None;
    let log_path = match log_dir.map(open_log_file) {
        Some(Ok((file, path))) => {
            builder.target(Target::Pipe(Box::new(TeeWriter { file })));
            Some(path)
        },
        Some(Err(e)) => {
            file_error = Some(e);
            None
        },
        None => None,
    };

    if builder.try_init().is_err() {
        return log_path;
    }

    log::info!("[logging] Logging initialized");
    if let Some(e) = file_error {
        log::warn!("[logging] File logging disabled: {}", e);
    }
    if let (Some(dir), Some(path)) = (log_dir, log_path.as_ref()) {
        log::info!("[logging] Log file: {:?}", path);
        let removed = cleanup_old_logs(dir, MAX_LOG_FILES);
        if removed > 0 {
            log::debug!("[logging] Removed {} old log files", removed);
        }
    }

    log_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_log_path_is_dated() {
        let dir = Path::new("logs");
        let name = current_log_path(dir)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with("mascot-host_"));
        assert!(name.ends_with(".log"));
        // mascot-host_YYYY-MM-DD.log
        assert_eq!(name.len(), "mascot-host_".len() + 10 + ".log".len());
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=7 {
            let path = dir.path().join(format!("mascot-host_2026-01-0{}.log", day));
            fs::write(&path, "x").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let removed = cleanup_old_logs(dir.path(), 5);
        assert_eq!(removed, 2);

        let remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|x| x == "log").unwrap_or(false))
            .collect();
        assert_eq!(remaining.len(), 5);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("absent"), 5), 0);
    }

    #[test]
    fn test_open_log_file_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let (_file, path) = open_log_file(&nested).unwrap();
        assert!(path.exists());
        assert!(path.starts_with(&nested));
    }
}

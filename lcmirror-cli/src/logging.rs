//! Tracing setup and size-based rotation of `~/.lcmirror/logs/sync.log`.
//!
//! Two layers: human-readable stderr filtered by `RUST_LOG` or `-v`, and a
//! plain-text file layer at debug level. The file is rotated before the
//! subscriber opens it, keeping at most 5 copies:
//!   sync.log → sync.log.1 → sync.log.2 → … → sync.log.5

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lcmirror_core::paths;

/// Maximum log file size before rotation (10 MiB).
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated backup files to keep.
pub const MAX_ROTATED_FILES: usize = 5;

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(home: &Path, verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let file_layer = open_log_file(home).map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(LevelFilter::DEBUG)
    });

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

/// Rotate, then open `sync.log` for appending. `None` if the file cannot be
/// opened; logging to stderr still works.
fn open_log_file(home: &Path) -> Option<fs::File> {
    let path = paths::sync_log_path(home);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok()?;
    }
    if let Err(err) = rotate_if_needed(&path, MAX_LOG_BYTES, MAX_ROTATED_FILES) {
        eprintln!("warning: log rotation failed for {}: {err}", path.display());
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()
}

/// Rotate `log_path` if its size is at least `max_bytes`.
///
/// `<name>.<max_files>` is deleted, `<name>.<n>` moves to `<name>.<n+1>`,
/// and the live file becomes `<name>.1`. Returns `true` if rotation occurred.
/// A missing file is not an error.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, max_files: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if size < max_bytes {
        return Ok(false);
    }

    let oldest = numbered_path(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..max_files).rev() {
        let src = numbered_path(log_path, n);
        if src.exists() {
            fs::rename(&src, numbered_path(log_path, n + 1))?;
        }
    }
    fs::rename(log_path, numbered_path(log_path, 1))?;
    Ok(true)
}

fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("sync.log");
    base.with_file_name(format!("{name}.{n}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn small_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("sync.log");
        fs::write(&log, b"hello").unwrap();
        assert!(!rotate_if_needed(&log, 1024, 5).unwrap());
        assert!(!numbered_path(&log, 1).exists());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(!rotate_if_needed(&dir.path().join("sync.log"), 1, 5).unwrap());
    }

    #[test]
    fn oversized_file_moves_to_dot_one() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("sync.log");
        fs::write(&log, vec![b'x'; 2048]).unwrap();
        assert!(rotate_if_needed(&log, 1024, 5).unwrap());
        assert!(!log.exists());
        assert_eq!(fs::metadata(numbered_path(&log, 1)).unwrap().len(), 2048);
    }

    #[test]
    fn backups_are_capped() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("sync.log");
        for n in 1..=3 {
            fs::write(numbered_path(&log, n), format!("old-{n}")).unwrap();
        }
        fs::write(&log, vec![b'x'; 16]).unwrap();

        assert!(rotate_if_needed(&log, 8, 3).unwrap());
        assert_eq!(fs::read_to_string(numbered_path(&log, 3)).unwrap(), "old-2");
        assert_eq!(fs::read_to_string(numbered_path(&log, 2)).unwrap(), "old-1");
        assert!(!numbered_path(&log, 4).exists());
    }
}

//! Run-level exclusive lock on `~/.lcmirror/run.lock`.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use anyhow::{bail, Context, Result};
use fs2::FileExt;

use lcmirror_core::paths;

/// Held for the duration of a mutating command; released on drop.
#[derive(Debug)]
pub struct RunLock {
    _file: File,
}

/// Take the lock without blocking; fails if another run holds it.
pub fn acquire(home: &Path) -> Result<RunLock> {
    let path = paths::lock_path(home);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("cannot open lock file {}", path.display()))?;
    if file.try_lock_exclusive().is_err() {
        bail!(
            "another lcmirror run is in progress (lock held on {})",
            path.display()
        );
    }
    Ok(RunLock { _file: file })
}

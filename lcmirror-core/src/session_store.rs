//! Persisted authentication context, `<home>/.lcmirror/session.json` (0600).

use std::path::Path;

use crate::atomic::{write_atomic, Mode};
use crate::error::{io_err, StoreError};
use crate::paths;
use crate::types::SessionState;

/// Load the stored session, `Ok(None)` when none has been saved yet.
pub fn load_at(home: &Path) -> Result<Option<SessionState>, StoreError> {
    let path = paths::session_path(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| StoreError::Corrupt { path, source })
}

/// Atomically replace the stored session.
pub fn save_at(home: &Path, session: &SessionState) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(session)?;
    write_atomic(&paths::session_path(home), json.as_bytes(), Mode::Private)
}

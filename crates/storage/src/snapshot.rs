// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON snapshot persistence.
//!
//! The daemon loads one snapshot at startup and writes one on shutdown and
//! after mutation batches. Writes go through a temp file + rename so a
//! crash mid-write never leaves a torn snapshot.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::state::MaterializedState;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O at {path}: {source}")]
    Io { path: std::path::PathBuf, source: std::io::Error },

    #[error("snapshot parse at {path}: {source}")]
    Parse { path: std::path::PathBuf, source: serde_json::Error },

    #[error("snapshot encode: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Load state from `path`; a missing file yields empty state.
pub fn load_snapshot(path: &Path) -> Result<MaterializedState, SnapshotError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no snapshot, starting empty");
            return Ok(MaterializedState::default());
        }
        Err(source) => return Err(SnapshotError::Io { path: path.to_path_buf(), source }),
    };
    serde_json::from_str(&content)
        .map_err(|source| SnapshotError::Parse { path: path.to_path_buf(), source })
}

/// Atomically write state to `path`.
pub fn save_snapshot(state: &MaterializedState, path: &Path) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(state).map_err(SnapshotError::Encode)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| SnapshotError::Io { path: parent.to_path_buf(), source })?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)
        .map_err(|source| SnapshotError::Io { path: tmp.clone(), source })?;
    std::fs::rename(&tmp, path)
        .map_err(|source| SnapshotError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;

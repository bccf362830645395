//! Snapshot writer: pretty-printed JSON files.
//!
//! Writes are best-effort checkpoints. A failure is logged and reported to
//! the caller as `false`; it never changes the pipeline's control flow. The
//! file is written in place, so an interrupted write can leave it truncated.

use crate::error::WriteError;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info};

/// Serialise `value` with two-space indentation and write it to `path`,
/// creating the parent directory if needed.
pub async fn write_json<T>(value: &T, path: &Path) -> Result<(), WriteError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value).map_err(|source| WriteError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| WriteError::Io {
                path: path.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, json)
        .await
        .map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a snapshot, logging instead of propagating failures.
///
/// Returns whether the file was written.
pub async fn write_snapshot<T>(value: &T, path: &Path) -> bool
where
    T: Serialize + ?Sized,
{
    info!("Writing to file: '{}'", path.display());
    match write_json(value, path).await {
        Ok(()) => true,
        Err(e) => {
            error!("Error writing to file at {}: {}", path.display(), e);
            false
        }
    }
}

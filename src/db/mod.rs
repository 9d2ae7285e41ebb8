// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local persistence (activity JSON file and credential env file).

pub mod activity_store;
pub mod credential_store;

pub use activity_store::ActivityStore;
pub use credential_store::CredentialStore;

use crate::error::{Result, SyncError};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Key names in the env file.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
    pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
    pub const TOKEN_EXPIRES_AT: &str = "TOKEN_EXPIRES_AT";
}

/// Replace `path` with `contents` atomically.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    write_atomic_with(path, |file| file.write_all(contents))
}

/// Replace `path` with whatever `write` produces, atomically.
///
/// `write` fills a temp file in the same directory, which is synced and then
/// renamed over the target. Readers see either the old file or the new one,
/// never a partial write. If `write` fails the temp file is removed and the
/// target is left as it was.
///
/// An existing target's permissions carry over to the replacement. A new
/// file gets the temp file's owner-only mode.
pub(crate) fn write_atomic_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".strava-sync-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| storage_err("create temp file in", dir, e))?;

    write(tmp.as_file_mut()).map_err(|e| storage_err("write temp file for", path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| storage_err("sync temp file for", path, e))?;

    if let Some(existing) = std::fs::metadata(path).ok().filter(|m| m.is_file()) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| storage_err("copy permissions for", path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| storage_err("replace", path, e.error))?;

    Ok(())
}

fn storage_err(action: &str, path: &Path, err: std::io::Error) -> SyncError {
    SyncError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

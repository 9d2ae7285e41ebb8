// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON-file backed activity store.
//!
//! The file is a pretty-printed array of activity objects. Concurrent
//! external edits between `load` and `save` are not detected; the last
//! writer wins.

use crate::db::write_atomic;
use crate::error::{Result, SyncError};
use crate::models::{ActivityRecord, LocalActivities};
use std::path::{Path, PathBuf};

/// Durable activity store at a fixed path.
#[derive(Debug, Clone)]
pub struct ActivityStore {
    path: PathBuf,
}

impl ActivityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store. A missing or blank file is an empty store.
    ///
    /// Unparseable content is an error rather than an empty store, so a
    /// later save cannot silently wipe history.
    pub fn load(&self) -> Result<LocalActivities> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No activity store yet, starting empty");
                return Ok(LocalActivities::new());
            }
            Err(e) => {
                return Err(SyncError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if contents.trim().is_empty() {
            return Ok(LocalActivities::new());
        }

        let records: Vec<ActivityRecord> = serde_json::from_str(&contents).map_err(|e| {
            SyncError::Storage(format!("Corrupt activity store {}: {}", self.path.display(), e))
        })?;

        let (activities, dropped) = LocalActivities::from_records(records);
        if dropped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                dropped,
                "Activity store contained duplicate ids, keeping first occurrence"
            );
        }

        Ok(activities)
    }

    /// Persist the store with a single atomic replace.
    pub fn save(&self, activities: &LocalActivities) -> Result<()> {
        let mut json = serde_json::to_vec_pretty(activities.snapshot())
            .map_err(|e| SyncError::Storage(format!("Failed to serialize activities: {}", e)))?;
        json.push(b'\n');

        write_atomic(&self.path, &json)?;

        tracing::debug!(
            path = %self.path.display(),
            count = activities.len(),
            "Activity store saved"
        );
        Ok(())
    }
}

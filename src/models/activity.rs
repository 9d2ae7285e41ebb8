// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity records and the in-memory activity store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Strava activity ID.
pub type ActivityId = u64;

/// One activity as returned by Strava.
///
/// Only `id` is interpreted. Every other field is kept verbatim (in the
/// order Strava sent it) so new upstream fields survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ActivityRecord {
    /// Local start time as sent by Strava, used for on-disk ordering.
    pub fn start_date_local(&self) -> Option<&str> {
        self.fields.get("start_date_local").and_then(Value::as_str)
    }
}

/// Ordered collection of activities holding at most one record per id.
#[derive(Debug, Clone, Default)]
pub struct LocalActivities {
    records: Vec<ActivityRecord>,
    ids: HashSet<ActivityId>,
}

impl LocalActivities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a sequence, keeping the first occurrence of each id.
    ///
    /// Returns the collection and how many duplicates were dropped.
    pub fn from_records(records: impl IntoIterator<Item = ActivityRecord>) -> (Self, usize) {
        let mut store = Self::new();
        let mut dropped = 0;
        for record in records {
            if !store.insert(record) {
                dropped += 1;
            }
        }
        (store, dropped)
    }

    /// Insert a record unless its id is already present.
    ///
    /// Existing records are never overwritten. Returns `true` if inserted.
    pub fn insert(&mut self, record: ActivityRecord) -> bool {
        if !self.ids.insert(record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains(&self, id: ActivityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only view of the records in on-disk order.
    ///
    /// This is what an exporter should consume.
    pub fn snapshot(&self) -> &[ActivityRecord] {
        &self.records
    }

    /// Stable sort by `start_date_local`; records without it come first.
    pub fn sort_chronologically(&mut self) {
        self.records.sort_by(|a, b| {
            let a = a.start_date_local().unwrap_or("");
            let b = b.start_date_local().unwrap_or("");
            a.cmp(b)
        });
    }
}

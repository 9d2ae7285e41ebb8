// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity synchronization.
//!
//! Handles one run:
//! 1. Validate the limit and load the local store (incremental only)
//! 2. Get a valid access token
//! 3. Fetch pages until the limit, end of history, or (incremental) a page
//!    containing an activity already stored
//! 4. Merge and persist with a single atomic write
//!
//! Nothing is written unless every step succeeds.

use crate::config::Config;
use crate::db::{ActivityStore, CredentialStore};
use crate::error::{Result, SyncError};
use crate::models::{ActivityId, ActivityRecord, LocalActivities};
use crate::services::strava::StravaClient;
use crate::services::token::TokenManager;
use std::collections::HashSet;
use std::fmt;

/// Merge policy for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Add unseen activities; stop at the first page touching known history.
    #[default]
    Incremental,
    /// Replace the store with the `limit` most recent activities.
    FullRefresh,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Incremental => f.write_str("incremental"),
            SyncMode::FullRefresh => f.write_str("full-refresh"),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Activities written that were not in the store before
    pub added: usize,
    /// Fetched activities not written (already stored, or repeated in the fetch)
    pub skipped: usize,
    /// Activities in the store after the run.
    ///
    /// Exception: a full refresh that fetches nothing reports 0 and leaves
    /// the previous store on disk untouched.
    pub total: usize,
}

/// Counts from merging one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageMerge {
    pub added: usize,
    pub skipped: usize,
    /// The page contained an id from `known`
    pub reached_known: bool,
}

/// Merge a fetched page into `target`.
///
/// Every record on the page is examined, including those after a known
/// one. Existing records are never overwritten. `known` is the set of ids
/// stored before the run began; repeats within the run are skipped but do
/// not count as reaching known history.
pub fn merge_page(
    target: &mut LocalActivities,
    page: Vec<ActivityRecord>,
    known: &HashSet<ActivityId>,
) -> PageMerge {
    let mut result = PageMerge::default();
    for record in page {
        if known.contains(&record.id) {
            result.reached_known = true;
        }
        if target.insert(record) {
            result.added += 1;
        } else {
            result.skipped += 1;
        }
    }
    result
}

/// Reconciles remote activity history into the local store.
pub struct SyncEngine {
    client: StravaClient,
    tokens: TokenManager,
    store: ActivityStore,
    page_size: u32,
}

impl SyncEngine {
    pub fn new(
        client: StravaClient,
        tokens: TokenManager,
        store: ActivityStore,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            tokens,
            store,
            page_size: page_size.max(1),
        }
    }

    /// Wire up client, credential store and activity store from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = StravaClient::new(config)?;
        let credentials = CredentialStore::load(&config.env_file)?;
        let tokens = TokenManager::new(client.clone(), credentials, config.refresh_margin_secs);
        let store = ActivityStore::new(&config.activities_file);
        Ok(Self::new(client, tokens, store, config.page_size))
    }

    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    /// Run one synchronization.
    pub async fn synchronize(&mut self, mode: SyncMode, limit: usize) -> Result<SyncReport> {
        if limit == 0 {
            return Err(SyncError::InvalidArgument(
                "limit must be a positive number of activities".to_string(),
            ));
        }

        tracing::info!(%mode, limit, "Starting activity sync");

        // Full refresh never reads the old file, so it also recovers a corrupt one.
        let existing = match mode {
            SyncMode::Incremental => self.store.load()?,
            SyncMode::FullRefresh => LocalActivities::new(),
        };

        let access_token = self.tokens.ensure_valid_credential().await?;

        let report = match mode {
            SyncMode::Incremental => self.run_incremental(&access_token, existing, limit).await?,
            SyncMode::FullRefresh => self.run_full_refresh(&access_token, limit).await?,
        };

        tracing::info!(
            %mode,
            added = report.added,
            skipped = report.skipped,
            total = report.total,
            "Activity sync complete"
        );
        Ok(report)
    }

    async fn run_incremental(
        &self,
        access_token: &str,
        mut local: LocalActivities,
        limit: usize,
    ) -> Result<SyncReport> {
        let known: HashSet<ActivityId> = local.snapshot().iter().map(|r| r.id).collect();
        let mut report = SyncReport::default();

        let mut pages = self.client.pages(access_token, self.page_size, limit);
        while let Some(page) = pages.next_page().await? {
            let merged = merge_page(&mut local, page, &known);
            report.added += merged.added;
            report.skipped += merged.skipped;

            if merged.reached_known {
                tracing::debug!(
                    pages = pages.pages_requested(),
                    "Reached already-stored activities, stopping"
                );
                break;
            }
        }

        if report.added > 0 {
            local.sort_chronologically();
            self.store.save(&local)?;
            tracing::info!(
                added = report.added,
                path = %self.store.path().display(),
                "Appended new activities"
            );
        } else {
            tracing::info!("No new activities found");
        }

        report.total = local.len();
        Ok(report)
    }

    async fn run_full_refresh(&self, access_token: &str, limit: usize) -> Result<SyncReport> {
        let none_known = HashSet::new();
        let mut fresh = LocalActivities::new();
        let mut report = SyncReport::default();

        let mut pages = self.client.pages(access_token, self.page_size, limit);
        while let Some(page) = pages.next_page().await? {
            let merged = merge_page(&mut fresh, page, &none_known);
            report.added += merged.added;
            report.skipped += merged.skipped;
        }

        if fresh.is_empty() {
            tracing::warn!(
                path = %self.store.path().display(),
                "Full refresh fetched no activities, leaving existing store untouched"
            );
            return Ok(report);
        }

        fresh.sort_chronologically();
        self.store.save(&fresh)?;
        tracing::info!(
            count = fresh.len(),
            path = %self.store.path().display(),
            "Replaced activity store"
        );

        report.total = fresh.len();
        Ok(report)
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for listing activities and refreshing tokens.
//!
//! Handles:
//! - Paginated activity listing
//! - Token refresh
//! - Rate limit detection (fatal to the run, never retried here)

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::models::ActivityRecord;
use serde::Deserialize;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a client from configuration.
    ///
    /// Every request carries the configured timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Fetch one page of the athlete's activities, newest first.
    ///
    /// Pages are 1-based. An empty page means there is no more history.
    pub async fn fetch_page(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivityRecord>> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await?;

        let records: Vec<ActivityRecord> = self.check_response_json(response).await?;
        tracing::debug!(page, per_page, count = records.len(), "Fetched activity page");
        Ok(records)
    }

    /// Lazily iterate pages until `limit` records or end of history.
    pub fn pages<'a>(
        &'a self,
        access_token: &'a str,
        page_size: u32,
        limit: usize,
    ) -> ActivityPages<'a> {
        ActivityPages::new(self, access_token, page_size, limit)
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SyncError::Network(format!("JSON parse error: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(SyncError::RateLimit(format!("HTTP {}: {}", status, body)));
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(SyncError::Auth(format!("HTTP {}: {}", status, body)));
        }

        Err(SyncError::Network(format!("HTTP {}: {}", status, body)))
    }
}

/// Token refresh response from Strava.
///
/// Strava also sends `expires_at`, but expiry is computed from
/// `expires_in` at receipt so local clock skew cannot keep a dead token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Finite page sequence over the activity list.
///
/// Requests use a constant `per_page` so page indices stay aligned; the page
/// that crosses the limit is truncated. Build a new one to restart.
pub struct ActivityPages<'a> {
    client: &'a StravaClient,
    access_token: &'a str,
    per_page: u32,
    limit: usize,
    next_page: u32,
    fetched: usize,
    done: bool,
}

impl<'a> ActivityPages<'a> {
    fn new(client: &'a StravaClient, access_token: &'a str, page_size: u32, limit: usize) -> Self {
        let per_page = u32::try_from(limit).unwrap_or(u32::MAX).min(page_size).max(1);
        Self {
            client,
            access_token,
            per_page,
            limit,
            next_page: 1,
            fetched: 0,
            done: limit == 0,
        }
    }

    /// Number of page requests made so far.
    pub fn pages_requested(&self) -> u32 {
        self.next_page - 1
    }

    /// Fetch the next page, or `None` once the sequence is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ActivityRecord>>> {
        if self.done {
            return Ok(None);
        }

        let mut page = self
            .client
            .fetch_page(self.access_token, self.next_page, self.per_page)
            .await?;
        self.next_page += 1;

        if page.is_empty() {
            self.done = true;
            return Ok(None);
        }

        let remaining = self.limit - self.fetched;
        page.truncate(remaining);
        self.fetched += page.len();
        if self.fetched >= self.limit {
            self.done = true;
        }

        Ok(Some(page))
    }
}

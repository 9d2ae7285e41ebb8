// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token lifecycle.
//!
//! Hands out an access token that will not expire within the refresh
//! margin, renewing it through the refresh token when needed and writing
//! the renewed pair back to the credential store.

use crate::config::MAX_REFRESH_MARGIN_SECS;
use crate::db::CredentialStore;
use crate::error::{Result, SyncError};
use crate::models::CredentialPair;
use crate::services::strava::StravaClient;
use crate::time_utils::format_epoch_secs;
use chrono::{DateTime, Duration, Utc};

/// Owns the credential store for the duration of a run.
pub struct TokenManager {
    client: StravaClient,
    store: CredentialStore,
    margin: Duration,
}

impl TokenManager {
    /// `margin_secs` is clamped to `0..=MAX_REFRESH_MARGIN_SECS`.
    pub fn new(client: StravaClient, store: CredentialStore, margin_secs: i64) -> Self {
        Self {
            client,
            store,
            margin: Duration::seconds(margin_secs.clamp(0, MAX_REFRESH_MARGIN_SECS)),
        }
    }

    pub fn credentials(&self) -> &CredentialPair {
        self.store.credentials()
    }

    /// Get a valid (non-expired) access token.
    pub async fn ensure_valid_credential(&mut self) -> Result<String> {
        self.ensure_valid_credential_at(Utc::now()).await
    }

    /// Same as [`Self::ensure_valid_credential`] with an explicit clock.
    ///
    /// At most one refresh call is made. A failed refresh is returned as
    /// [`SyncError::Auth`] and never retried, since it may mean access was
    /// revoked.
    pub async fn ensure_valid_credential_at(&mut self, now: DateTime<Utc>) -> Result<String> {
        let current = self.store.credentials();

        let refresh_token = current.refresh_token.clone().ok_or_else(|| {
            SyncError::Auth(
                "No refresh token found; run the authorization flow first".to_string(),
            )
        })?;

        if let Some(token) = current.usable_access_token(now, self.margin) {
            return Ok(token.to_string());
        }

        tracing::info!(
            expires_at = ?current.expires_at.map(format_epoch_secs),
            "Access token expired or expiring soon, refreshing"
        );

        let response = self
            .client
            .refresh_token(&refresh_token)
            .await
            .map_err(|e| SyncError::Auth(format!("Token refresh failed: {}", e)))?;

        let expires_at = Utc::now().timestamp().saturating_add(response.expires_in);
        let rotated = response
            .refresh_token
            .as_deref()
            .is_some_and(|t| !t.is_empty() && t != refresh_token);

        let renewed = CredentialPair {
            access_token: Some(response.access_token.clone()),
            refresh_token: response
                .refresh_token
                .filter(|t| !t.is_empty())
                .or(Some(refresh_token)),
            expires_at: Some(expires_at),
        };

        self.store.update(renewed)?;

        tracing::info!(
            expires_at = %format_epoch_secs(expires_at),
            refresh_token_rotated = rotated,
            path = %self.store.path().display(),
            "Access token refreshed and saved"
        );
        Ok(response.access_token)
    }
}

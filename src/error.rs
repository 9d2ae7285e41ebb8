// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the synchronization engine.
//!
//! Every failure surfaces to the caller unchanged; nothing here retries.

/// Synchronization error.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Refresh credential missing, revoked, or the renewal call failed.
    /// Requires running the authorization flow again.
    #[error("Authorization error: {0}")]
    Auth(String),

    /// Strava throttled us. Abort the run; do not retry automatically.
    #[error("Strava rate limit exceeded: {0}")]
    RateLimit(String),

    /// Transient connectivity or upstream failure. Re-run the whole sync.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Local file could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SyncError {
    /// Whether re-invoking the whole run may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Network(_))
    }

    /// Whether the stored credentials are unusable until re-authorization.
    pub fn requires_reauthorization(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SyncError::Network(format!("Request timed out: {}", err))
        } else if err.is_decode() {
            SyncError::Network(format!("Malformed response body: {}", err))
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, SyncError>;

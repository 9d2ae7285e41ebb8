// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth credential pair.

use chrono::{DateTime, Duration, Utc};

/// Access/refresh token pair with the access token's expiry.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Epoch seconds after which `access_token` is invalid
    pub expires_at: Option<i64>,
}

impl CredentialPair {
    /// The access token, if present and not within `margin` of expiry.
    ///
    /// A missing or out-of-range expiry counts as expired.
    pub fn usable_access_token(&self, now: DateTime<Utc>, margin: Duration) -> Option<&str> {
        let expires_at = DateTime::from_timestamp(self.expires_at?, 0)?;
        if now.checked_add_signed(margin)? < expires_at {
            self.access_token.as_deref()
        } else {
            None
        }
    }
}

// Tokens never reach logs.
impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

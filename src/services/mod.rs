// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod strava;
pub mod sync;
pub mod token;

pub use strava::{ActivityPages, StravaClient, TokenRefreshResponse};
pub use sync::{merge_page, PageMerge, SyncEngine, SyncMode, SyncReport};
pub use token::TokenManager;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Sync: keep a local copy of your Strava activity history
//!
//! This crate renews OAuth tokens as needed, pages through the athlete's
//! activities and merges them into a JSON file, either incrementally or
//! as a full refresh.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

pub use error::{Result, SyncError};
pub use services::{SyncEngine, SyncMode, SyncReport};

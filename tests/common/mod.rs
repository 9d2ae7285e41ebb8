// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for integration tests.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, RwLock};
use strava_sync::config::Config;
use strava_sync::SyncEngine;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ACTIVITIES_PATH: &str = "/athlete/activities";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Build a Strava-like summary activity. Higher ids are more recent.
pub fn activity_json(id: u64) -> Value {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap() + Duration::hours(id as i64);
    json!({
        "id": id,
        "name": format!("Activity {}", id),
        "type": "Run",
        "start_date_local": start.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        "distance": 1000.0 + id as f64,
        "moving_time": 600,
        "elapsed_time": 660,
        "average_heartrate": 142.5,
        "map": { "summary_polyline": "abc" }
    })
}

/// Remote activity history served newest-first with `page`/`per_page` paging.
#[derive(Clone, Default)]
pub struct FakeHistory {
    activities: Arc<RwLock<Vec<Value>>>,
}

impl FakeHistory {
    /// History with ids `1..=count`.
    pub fn with_count(count: u64) -> Self {
        let history = Self::default();
        history.add_newer(1..=count);
        history
    }

    /// Record new activities on the remote side.
    pub fn add_newer(&self, ids: impl IntoIterator<Item = u64>) {
        let mut activities = self.activities.write().unwrap();
        for id in ids {
            activities.insert(0, activity_json(id));
        }
    }
}

impl Respond for FakeHistory {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut page = 1usize;
        let mut per_page = 30usize;
        for (key, value) in request.url.query_pairs() {
            match key.as_ref() {
                "page" => page = value.parse().unwrap(),
                "per_page" => per_page = value.parse().unwrap(),
                _ => {}
            }
        }

        let activities = self.activities.read().unwrap();
        let start = (page - 1) * per_page;
        let slice: Vec<Value> = activities.iter().skip(start).take(per_page).cloned().collect();
        ResponseTemplate::new(200).set_body_json(slice)
    }
}

/// A mock Strava plus a scratch directory holding the env and activity files.
pub struct TestEnv {
    pub server: MockServer,
    pub dir: TempDir,
    pub config: Config,
}

impl TestEnv {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let config = Config {
            client_id: "12345".to_string(),
            client_secret: "shh".to_string(),
            api_base_url: server.uri(),
            token_url: format!("{}{}", server.uri(), TOKEN_PATH),
            env_file: dir.path().join(".env"),
            activities_file: dir.path().join("activities.json"),
            ..Config::default()
        };
        Self {
            server,
            dir,
            config,
        }
    }

    /// Write an env file with a token valid for another hour.
    pub fn write_valid_tokens(&self, access_token: &str) {
        let expires_at = (Utc::now() + Duration::hours(1)).timestamp();
        write_env(&self.config.env_file, Some(access_token), Some("refresh-1"), Some(expires_at));
    }

    /// Serve `history` to requests bearing `access_token`.
    pub async fn serve_history(&self, history: &FakeHistory, access_token: &str) {
        Mock::given(method("GET"))
            .and(path(ACTIVITIES_PATH))
            .and(header("authorization", format!("Bearer {}", access_token).as_str()))
            .respond_with(history.clone())
            .mount(&self.server)
            .await;
    }

    pub fn engine(&self) -> SyncEngine {
        SyncEngine::from_config(&self.config).unwrap()
    }

    /// Number of activity list requests the server has seen.
    pub async fn activity_requests(&self) -> usize {
        self.requests_to(ACTIVITIES_PATH).await
    }

    pub async fn token_requests(&self) -> usize {
        self.requests_to(TOKEN_PATH).await
    }

    async fn requests_to(&self, wanted: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == wanted)
            .count()
    }

    /// Ids in the on-disk store, in file order.
    pub fn stored_ids(&self) -> Vec<u64> {
        let raw = std::fs::read_to_string(&self.config.activities_file).unwrap();
        let records: Vec<Value> = serde_json::from_str(&raw).unwrap();
        records.iter().map(|r| r["id"].as_u64().unwrap()).collect()
    }
}

/// Write an env file with client settings and the given token fields.
pub fn write_env(
    path: &Path,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    expires_at: Option<i64>,
) {
    let mut contents = String::from("CLIENT_ID=12345\nCLIENT_SECRET=shh\n");
    if let Some(token) = access_token {
        contents.push_str(&format!("ACCESS_TOKEN={}\n", token));
    }
    if let Some(token) = refresh_token {
        contents.push_str(&format!("REFRESH_TOKEN={}\n", token));
    }
    if let Some(secs) = expires_at {
        contents.push_str(&format!("TOKEN_EXPIRES_AT={}\n", secs));
    }
    std::fs::write(path, contents).unwrap();
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from the `.env` file and environment.
//!
//! The same `.env` file doubles as the credential store, so the token
//! fields are read by [`crate::db::CredentialStore`] rather than here.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Strava rejects `per_page` above this value.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Upper bound on the token refresh margin (one day).
pub const MAX_REFRESH_MARGIN_SECS: i64 = 24 * 60 * 60;

const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const DEFAULT_ACTIVITIES_FILE: &str = "activities.json";
const DEFAULT_PAGE_SIZE: u32 = 30;
const DEFAULT_REFRESH_MARGIN_SECS: i64 = 5 * 60;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID
    pub client_id: String,
    /// Strava OAuth client secret
    pub client_secret: String,
    /// Base URL of the REST API (no trailing slash)
    pub api_base_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// Key-value file holding client and token settings
    pub env_file: PathBuf,
    /// JSON file holding the local activity store
    pub activities_file: PathBuf,
    /// Records requested per page
    pub page_size: u32,
    /// Renew the access token this many seconds before it expires
    pub refresh_margin_secs: i64,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            env_file: PathBuf::from(".env"),
            activities_file: PathBuf::from(DEFAULT_ACTIVITIES_FILE),
            page_size: DEFAULT_PAGE_SIZE,
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from `env_file` (if present) and the process environment.
    ///
    /// Variables already set in the environment win over the file.
    pub fn from_env_file(env_file: &Path) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::from_path(env_file) {
            tracing::debug!(path = %env_file.display(), error = %e, "No env file loaded");
        }

        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            api_base_url: env::var("STRAVA_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            token_url: env::var("STRAVA_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            env_file: env_file.to_path_buf(),
            activities_file: env::var("ACTIVITIES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ACTIVITIES_FILE)),
            page_size: parse_or("PAGE_SIZE", DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            refresh_margin_secs: parse_or("TOKEN_REFRESH_MARGIN_SECS", DEFAULT_REFRESH_MARGIN_SECS)
                .clamp(0, MAX_REFRESH_MARGIN_SECS),
            http_timeout: Duration::from_secs(parse_or(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0} (set it in the env file or environment)")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_from_env_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "CLIENT_ID=test_id").unwrap();
        writeln!(file, "CLIENT_SECRET= test_secret ").unwrap();
        writeln!(file, "PAGE_SIZE=500").unwrap();
        drop(file);

        let config = Config::from_env_file(&path).expect("Config should load");

        assert_eq!(config.client_id, "test_id");
        assert_eq!(config.client_secret, "test_secret");
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
        assert_eq!(config.refresh_margin_secs, 300);
        assert_eq!(config.env_file, path);
    }

    #[test]
    fn test_defaults_match_strava() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://www.strava.com/api/v3");
        assert_eq!(config.token_url, "https://www.strava.com/oauth/token");
        assert_eq!(config.page_size, 30);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }
}

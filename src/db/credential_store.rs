// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential pair persisted in the `.env` file.
//!
//! Only `ACCESS_TOKEN`, `REFRESH_TOKEN` and `TOKEN_EXPIRES_AT` are owned
//! here. Every other line of the file (client id/secret, comments) is kept
//! as-is when the pair is rewritten.

use crate::db::{keys, write_atomic};
use crate::error::{Result, SyncError};
use crate::models::CredentialPair;
use std::path::{Path, PathBuf};

/// Exclusively-owned handle on the persisted credential pair.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    current: CredentialPair,
}

impl CredentialStore {
    /// Read the credential pair from `path`.
    ///
    /// A missing file yields an empty pair; the caller then fails with an
    /// authorization error when it needs a token.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let current = read_pair(&path)?;
        Ok(Self { path, current })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn credentials(&self) -> &CredentialPair {
        &self.current
    }

    /// Replace the stored pair.
    ///
    /// The file is rewritten atomically before the in-memory copy changes,
    /// so a failed write leaves both untouched.
    pub fn update(&mut self, pair: CredentialPair) -> Result<()> {
        let existing = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(SyncError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let rendered = render_env(&existing, &pair);
        write_atomic(&self.path, rendered.as_bytes())?;
        self.current = pair;
        Ok(())
    }
}

fn read_pair(path: &Path) -> Result<CredentialPair> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No credential file found");
            return Ok(CredentialPair::default());
        }
        Err(e) => {
            return Err(SyncError::Storage(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            )))
        }
    };

    let mut pair = CredentialPair::default();
    for item in iter {
        let (key, value) = item.map_err(|e| {
            SyncError::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        let value = value.trim().to_string();
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            keys::ACCESS_TOKEN => pair.access_token = Some(value),
            keys::REFRESH_TOKEN => pair.refresh_token = Some(value),
            keys::TOKEN_EXPIRES_AT => match value.parse() {
                Ok(secs) => pair.expires_at = Some(secs),
                Err(_) => {
                    tracing::warn!(value = %value, "Ignoring unparseable TOKEN_EXPIRES_AT");
                }
            },
            _ => {}
        }
    }

    Ok(pair)
}

/// Rewrite the owned keys in `existing`, appending any that are missing.
///
/// Keys whose value is `None` in `pair` are left alone.
fn render_env(existing: &str, pair: &CredentialPair) -> String {
    let expires_at = pair.expires_at.map(|secs| secs.to_string());
    let mut owned: Vec<(&str, Option<&str>, bool)> = vec![
        (keys::ACCESS_TOKEN, pair.access_token.as_deref(), false),
        (keys::REFRESH_TOKEN, pair.refresh_token.as_deref(), false),
        (keys::TOKEN_EXPIRES_AT, expires_at.as_deref(), false),
    ];

    let mut out = String::with_capacity(existing.len() + 128);
    for line in existing.lines() {
        let key = line.trim_start().split('=').next().unwrap_or("").trim();
        match owned.iter_mut().find(|(k, v, _)| *k == key && v.is_some()) {
            Some((k, Some(v), written)) => {
                if !*written {
                    out.push_str(&format!("{}={}\n", k, v));
                    *written = true;
                }
            }
            _ => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    for (k, v, written) in &owned {
        if let (Some(v), false) = (v, written) {
            out.push_str(&format!("{}={}\n", k, v));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str, expires_at: i64) -> CredentialPair {
        CredentialPair {
            access_token: Some(access.to_string()),
            refresh_token: Some(refresh.to_string()),
            expires_at: Some(expires_at),
        }
    }

    #[test]
    fn test_render_replaces_in_place_and_keeps_other_lines() {
        let existing = "# strava app\nCLIENT_ID=123\nACCESS_TOKEN=old\nCLIENT_SECRET=s3cr3t\nREFRESH_TOKEN=oldr\n";
        let rendered = render_env(existing, &pair("new", "newr", 1700000000));
        assert_eq!(
            rendered,
            "# strava app\nCLIENT_ID=123\nACCESS_TOKEN=new\nCLIENT_SECRET=s3cr3t\nREFRESH_TOKEN=newr\nTOKEN_EXPIRES_AT=1700000000\n"
        );
    }

    #[test]
    fn test_render_into_empty_file() {
        let rendered = render_env("", &pair("a", "r", 5));
        assert_eq!(rendered, "ACCESS_TOKEN=a\nREFRESH_TOKEN=r\nTOKEN_EXPIRES_AT=5\n");
    }

    #[test]
    fn test_render_collapses_duplicate_keys() {
        let rendered = render_env("ACCESS_TOKEN=x\nACCESS_TOKEN=y\n", &pair("a", "r", 5));
        assert_eq!(rendered.matches("ACCESS_TOKEN=").count(), 1);
        assert!(rendered.starts_with("ACCESS_TOKEN=a\n"));
    }

    #[test]
    fn test_render_leaves_unset_keys_alone() {
        let partial = CredentialPair {
            access_token: Some("a".to_string()),
            refresh_token: None,
            expires_at: None,
        };
        let rendered = render_env("REFRESH_TOKEN=keep\n", &partial);
        assert_eq!(rendered, "REFRESH_TOKEN=keep\nACCESS_TOKEN=a\n");
    }

    #[test]
    fn test_load_missing_file_is_empty_pair() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = CredentialStore::load(dir.path().join(".env")).unwrap();
        assert_eq!(store.credentials(), &CredentialPair::default());
    }

    #[test]
    fn test_update_then_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "CLIENT_ID=123\nREFRESH_TOKEN=first\n").unwrap();

        let mut store = CredentialStore::load(&path).unwrap();
        assert_eq!(store.credentials().refresh_token.as_deref(), Some("first"));
        assert_eq!(store.credentials().expires_at, None);

        store.update(pair("acc", "second", 42)).unwrap();

        let reloaded = CredentialStore::load(&path).unwrap();
        assert_eq!(reloaded.credentials(), &pair("acc", "second", 42));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("CLIENT_ID=123\n"));
    }
}

//! Credential loader: reads externally provisioned OAuth files and
//! refreshes the access token in place when it has expired.

use std::fs;
use std::path::Path;

use chrono::Utc;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ScrapeConfig;
use crate::error::AuthError;

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// Refresh slightly before the recorded expiry to absorb clock skew.
const EXPIRY_SLACK_MS: i64 = 60_000;

#[derive(Debug, Deserialize)]
struct OauthKeys {
    installed: AppKeys,
}

#[derive(Debug, Deserialize)]
struct AppKeys {
    client_id: String,
    client_secret: String,
}

/// Stored token file. Fields we don't understand are carried through the
/// rewrite untouched.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_date: Option<i64>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

/// A usable authorization handle for the spreadsheet service.
pub struct Authorizer {
    access_token: String,
}

impl Authorizer {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[cfg(test)]
    pub(crate) fn with_access_token(token: &str) -> Self {
        Self {
            access_token: token.to_string(),
        }
    }
}

/// True when the token must be refreshed before use. A token with no
/// recorded expiry is treated as expired.
fn needs_refresh(expiry_date_ms: Option<i64>, now_ms: i64) -> bool {
    match expiry_date_ms {
        Some(expiry) => expiry - EXPIRY_SLACK_MS <= now_ms,
        None => true,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AuthError> {
    let raw = fs::read_to_string(path).map_err(|source| AuthError::MissingFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AuthError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the app keys and stored token, refreshing and persisting the
/// token if it has expired.
pub fn load_credentials(http: &Client, config: &ScrapeConfig) -> Result<Authorizer, AuthError> {
    let keys: OauthKeys = read_json(&config.keys_file)?;
    let mut stored: StoredToken = read_json(&config.token_file)?;

    if !needs_refresh(stored.expiry_date, Utc::now().timestamp_millis()) {
        return Ok(Authorizer {
            access_token: stored.access_token,
        });
    }

    println!("  Refreshing OAuth token...");
    let refreshed = refresh_token(http, &keys.installed, &stored.refresh_token)?;

    stored.access_token = refreshed.access_token.clone();
    stored.expiry_date = Some(Utc::now().timestamp_millis() + refreshed.expires_in * 1000);
    persist_token(&config.token_file, &stored)?;
    println!("  Token refreshed and saved.");

    Ok(Authorizer {
        access_token: refreshed.access_token,
    })
}

fn refresh_token(
    http: &Client,
    keys: &AppKeys,
    refresh_token: &str,
) -> Result<RefreshResponse, AuthError> {
    let response = http
        .post(TOKEN_URI)
        .form(&[
            ("client_id", keys.client_id.as_str()),
            ("client_secret", keys.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()?;

    let status = response.status();
    if !status.is_success() {
        // invalid_grant here means the refresh token has been revoked.
        return Err(AuthError::RefreshRejected {
            status,
            body: response.text().unwrap_or_default(),
        });
    }

    Ok(response.json()?)
}

fn persist_token(path: &Path, token: &StoredToken) -> Result<(), AuthError> {
    let raw = serde_json::to_string_pretty(token).map_err(|source| AuthError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, raw).map_err(AuthError::Persist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn refresh_needed_without_expiry() {
        assert!(needs_refresh(None, 1_000));
    }

    #[test]
    fn refresh_needed_when_expired() {
        assert!(needs_refresh(Some(500), 1_000));
        // Inside the slack window counts as expired too.
        assert!(needs_refresh(Some(1_000 + EXPIRY_SLACK_MS - 1), 1_000));
    }

    #[test]
    fn no_refresh_for_fresh_token() {
        assert!(!needs_refresh(Some(1_000 + EXPIRY_SLACK_MS + 1), 1_000));
    }

    #[test]
    fn reads_app_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"installed": {{"client_id": "id-1", "client_secret": "s3cret"}}}}"#
        )
        .unwrap();

        let keys: OauthKeys = read_json(file.path()).unwrap();
        assert_eq!(keys.installed.client_id, "id-1");
        assert_eq!(keys.installed.client_secret, "s3cret");
    }

    #[test]
    fn missing_file_is_auth_error() {
        let err = read_json::<OauthKeys>(Path::new("/nonexistent/keys.json")).unwrap_err();
        assert!(matches!(err, AuthError::MissingFile { .. }));
    }

    #[test]
    fn malformed_file_is_auth_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();
        let err = read_json::<OauthKeys>(file.path()).unwrap_err();
        assert!(matches!(err, AuthError::Malformed { .. }));
    }

    #[test]
    fn token_rewrite_preserves_unknown_fields() {
        let raw = r#"{
            "access_token": "old",
            "refresh_token": "refresh",
            "scope": "https://www.googleapis.com/auth/spreadsheets",
            "token_type": "Bearer"
        }"#;

        let mut token: StoredToken = serde_json::from_str(raw).unwrap();
        token.access_token = "new".to_string();
        token.expiry_date = Some(42);

        let file = NamedTempFile::new().unwrap();
        persist_token(file.path(), &token).unwrap();

        let reread: StoredToken = read_json(file.path()).unwrap();
        assert_eq!(reread.access_token, "new");
        assert_eq!(reread.refresh_token, "refresh");
        assert_eq!(reread.expiry_date, Some(42));
        assert_eq!(
            reread.extra.get("token_type").and_then(|v| v.as_str()),
            Some("Bearer")
        );
    }
}

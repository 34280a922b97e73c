//! Stored OAuth credentials for Drive access.
//!
//! The token file uses the authorized-user JSON layout. An expired token is
//! refreshed with the refresh-token grant and written back; obtaining a first
//! token interactively is out of scope.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MtextsError, Result};

pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens expiring within this window are refreshed ahead of time.
const EXPIRY_SKEW_SECS: i64 = 225;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// Fields this tool does not interpret, preserved on write-back.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthorizedUser {
    fn expiry_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiry.as_deref()?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        // Naive timestamps are UTC.
        let trimmed = raw.trim_end_matches('Z');
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// True when an access token is present and not about to expire. A token
    /// without an expiry is treated as valid.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.token.as_deref().map_or(true, str::is_empty) {
            return false;
        }
        match self.expiry_time() {
            Some(expiry) => expiry - chrono::Duration::seconds(EXPIRY_SKEW_SECS) > now,
            None => self.expiry.is_none(),
        }
    }
}

/// OAuth client registration as downloaded from the cloud console.
#[derive(Debug, Deserialize)]
struct ClientSecrets {
    installed: Option<ClientRegistration>,
    web: Option<ClientRegistration>,
}

#[derive(Debug, Deserialize)]
struct ClientRegistration {
    client_id: String,
    client_secret: String,
    token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

/// Returns a usable Drive access token, refreshing and persisting it when needed.
pub async fn load_access_token(token_path: &Path, credentials_path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(token_path).map_err(|e| {
        MtextsError::Auth(format!(
            "Cannot read stored token {}: {e}. Authorize once with the {} scope and save the authorized-user JSON there.",
            token_path.display(),
            DRIVE_READONLY_SCOPE
        ))
    })?;
    let mut user: AuthorizedUser = serde_json::from_str(&raw).map_err(|e| {
        MtextsError::Auth(format!("Invalid token file {}: {e}", token_path.display()))
    })?;

    if user.is_valid_at(Utc::now()) {
        tracing::debug!("Using stored access token from {}", token_path.display());
        return user
            .token
            .ok_or_else(|| MtextsError::Auth("Stored token is empty".to_string()));
    }

    fill_client_registration(&mut user, credentials_path)?;
    let token = refresh(&mut user).await?;

    let serialized = serde_json::to_string(&user)?;
    std::fs::write(token_path, serialized)?;
    tracing::info!("Refreshed access token saved to {}", token_path.display());

    Ok(token)
}

/// Takes client id and secret from the client secrets file when the token file lacks them.
fn fill_client_registration(user: &mut AuthorizedUser, credentials_path: &Path) -> Result<()> {
    if user.client_id.is_some() && user.client_secret.is_some() {
        return Ok(());
    }

    let raw = std::fs::read_to_string(credentials_path).map_err(|e| {
        MtextsError::Auth(format!(
            "Token has no client registration and {} is unreadable: {e}",
            credentials_path.display()
        ))
    })?;
    let secrets: ClientSecrets = serde_json::from_str(&raw)?;
    let registration = secrets.installed.or(secrets.web).ok_or_else(|| {
        MtextsError::Auth(format!(
            "{} has neither an 'installed' nor a 'web' section",
            credentials_path.display()
        ))
    })?;

    user.client_id.get_or_insert(registration.client_id);
    user.client_secret.get_or_insert(registration.client_secret);
    if user.token_uri.is_none() {
        user.token_uri = registration.token_uri;
    }
    Ok(())
}

async fn refresh(user: &mut AuthorizedUser) -> Result<String> {
    let refresh_token = user
        .refresh_token
        .clone()
        .ok_or_else(|| MtextsError::Auth("Stored token expired and has no refresh token".to_string()))?;
    let client_id = user.client_id.clone().unwrap_or_default();
    let client_secret = user.client_secret.clone().unwrap_or_default();
    let token_uri = user
        .token_uri
        .clone()
        .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = http
        .post(&token_uri)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MtextsError::Auth(format!(
            "Token refresh failed with {status}: {body}"
        )));
    }

    let refreshed: TokenResponse = response.json().await?;
    user.token = Some(refreshed.access_token.clone());
    user.expiry = refreshed.expires_in.map(|secs| {
        (Utc::now() + chrono::Duration::seconds(secs))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string()
    });
    if let Some(rotated) = refreshed.refresh_token {
        user.refresh_token = Some(rotated);
    }

    Ok(refreshed.access_token)
}

//! Service-account authentication for the Google Sheets API.
//!
//! Mints short-lived OAuth access tokens by signing a JWT with the service
//! account's RSA key and exchanging it at the token endpoint.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, Result};

/// OAuth scope for spreadsheet access.
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Assertion lifetime requested from the token endpoint, in seconds.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Parsed service-account key file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Load and parse a key file.
    ///
    /// Missing or malformed credentials come back as a config error so the
    /// remote backend can fail once at startup.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!(
                "cannot read service account key {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::config(format!("invalid service account key: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Mints and caches access tokens for the Sheets scope.
pub struct TokenProvider {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, http: Client) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::config(format!("invalid service account private key: {e}")))?;
        Ok(Self {
            key,
            signing_key,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Current access token, refreshed shortly before expiry.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::auth(format!("system clock before epoch: {e}")))?
            .as_secs();

        let claims = Claims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| AppError::auth(format!("JWT signing failed: {e}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(expires_in = token.expires_in, "access token refreshed");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now()
                + Duration::from_secs(token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS)),
        })
    }
}

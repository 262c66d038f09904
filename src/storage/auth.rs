//! Google service-account authentication
//!
//! Signs a JWT assertion with the account's private key and trades it for a
//! short-lived OAuth2 access token (the "two-legged" server-to-server flow).

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::drive::read_json;
use crate::config::{ExecutionContext, Secrets};
use crate::consts::{DRIVE_SCOPE, SERVICE_ACCOUNT_SECRET_ENV};
use crate::error::DriveError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires
const EXPIRY_MARGIN: TimeDelta = TimeDelta::seconds(60);

/// The fields of a service-account key file this client needs
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServiceAccountKey {
    pub(crate) client_email: String,
    pub(crate) private_key: String,
    #[serde(default = "default_token_uri")]
    pub(crate) token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Key from the CI secret for non-interactive runs, otherwise from `path`
    pub(crate) fn load(
        context: ExecutionContext,
        secrets: &Secrets,
        path: &Path,
    ) -> Result<Self, DriveError> {
        if context.is_interactive() {
            return Self::from_file(path);
        }
        match secrets.service_account_json.as_deref() {
            Some(json) if !json.trim().is_empty() => Self::from_json(json),
            _ => Err(DriveError::MissingSecret {
                var: SERVICE_ACCOUNT_SECRET_ENV,
            }),
        }
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self, DriveError> {
        if !path.exists() {
            return Err(DriveError::MissingCredentials {
                path: path.to_path_buf(),
            });
        }
        let json = fs::read_to_string(path).map_err(|source| DriveError::ReadCredentials {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub(crate) fn from_json(json: &str) -> Result<Self, DriveError> {
        serde_json::from_str(json).map_err(DriveError::InvalidCredentials)
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl<'a> Claims<'a> {
    fn new(key: &'a ServiceAccountKey, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: &key.client_email,
            scope: DRIVE_SCOPE,
            aud: &key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, DriveError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &Claims::new(key, now),
        &encoding_key,
    )?;
    Ok(token)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + EXPIRY_MARGIN < self.expires_at
    }
}

/// Hands out a valid access token, fetching a new one when needed
pub(crate) struct TokenProvider {
    key: ServiceAccountKey,
    agent: ureq::Agent,
    token: Option<AccessToken>,
}

impl TokenProvider {
    pub(crate) fn new(key: ServiceAccountKey, agent: ureq::Agent) -> Self {
        Self {
            key,
            agent,
            token: None,
        }
    }

    pub(crate) fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub(crate) fn bearer(&mut self) -> Result<String, DriveError> {
        let now = Utc::now();
        if let Some(token) = &self.token
            && token.is_fresh(now)
        {
            return Ok(format!("Bearer {}", token.value));
        }

        let token = self.fetch(now)?;
        let header = format!("Bearer {}", token.value);
        self.token = Some(token);
        Ok(header)
    }

    fn fetch(&self, now: DateTime<Utc>) -> Result<AccessToken, DriveError> {
        let assertion = sign_assertion(&self.key, now)?;
        let response = self
            .agent
            .post(self.key.token_uri.as_str())
            .send_form([("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])?;
        let parsed: TokenResponse = read_json(response)?;
        debug!(
            account = %self.key.client_email,
            expires_in = parsed.expires_in,
            "Fetched Drive access token"
        );
        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: now + TimeDelta::seconds(parsed.expires_in),
        })
    }
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application credentials used for the client-credentials grant.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// App access token. Expiry is not tracked: one token serves a whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BroadcasterId(String);

impl BroadcasterId {
    pub fn new(id: impl Into<String>) -> Self {
        BroadcasterId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BroadcasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A clip as returned by the `/clips` endpoint.
///
/// Only `url` and `title` are relied upon by the pipeline; the remaining
/// platform fields are kept for logging and default when absent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClipRecord {
    #[serde(default)]
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub broadcaster_name: String,
    #[serde(default)]
    pub creator_name: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub thumbnail_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HelixUser {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HelixData<T> {
    pub(crate) data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) expires_in: Option<u64>,
}

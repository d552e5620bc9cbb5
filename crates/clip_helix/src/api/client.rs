use chrono::{DateTime, SecondsFormat, Utc};
use futures::{stream::BoxStream, StreamExt};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    domain::{HelixData, HelixUser, TokenResponse},
    paginate, AccessToken, AuthError, BroadcasterId, ClipRecord, ClipSource, Credentials,
    MetadataError, Page, TokenIssuer,
};

/// `reqwest` backed Helix client.
#[derive(Debug, Clone)]
pub struct HelixClient {
    http: Client,
    client_id: String,
    api_base: String,
    token_url: String,
}

impl HelixClient {
    const API_BASE: &str = "https://api.twitch.tv/helix";
    const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

    /// Largest page size the clips endpoint accepts
    pub const MAX_PAGE_SIZE: u8 = 100;
    /// Upper bound on pages followed for a single windowed query
    pub const MAX_PAGES: usize = 1_000;

    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            client_id: client_id.into(),
            api_base: Self::API_BASE.into(),
            token_url: Self::TOKEN_URL.into(),
        }
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Authenticated GET against a Helix endpoint.
    #[tracing::instrument(skip(self, token))]
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: &AccessToken,
        query: &[(&str, String)],
    ) -> Result<T, MetadataError> {
        let url = format!("{}/{endpoint}", self.api_base);
        let response = self
            .http
            .get(&url)
            .header("Client-Id", &self.client_id)
            .bearer_auth(token.secret())
            .query(query)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = ?e, endpoint, "Helix request failed"))?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            tracing::error!(endpoint, status = status.as_u16(), "Helix returned an error status");
            return Err(MetadataError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|reason| MetadataError::Decode {
            endpoint: endpoint.to_string(),
            reason,
        })
    }

    async fn clip_page(
        &self,
        broadcaster_id: &BroadcasterId,
        token: &AccessToken,
        started_at: &str,
        after: Option<String>,
    ) -> Result<Page<ClipRecord>, MetadataError> {
        let mut query = vec![
            ("broadcaster_id", broadcaster_id.to_string()),
            ("first", Self::MAX_PAGE_SIZE.to_string()),
            ("started_at", started_at.to_string()),
        ];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }

        let page: Page<ClipRecord> = self.get("clips", token, &query).await?;
        tracing::debug!(
            count = page.data.len(),
            has_cursor = page.pagination.cursor.is_some(),
            "Fetched clips page"
        );
        Ok(page)
    }
}

async fn read_body(response: Response) -> Result<(reqwest::StatusCode, String), reqwest::Error> {
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

/// Validates a token endpoint reply.
fn parse_token_response(status: u16, body: &str) -> Result<AccessToken, AuthError> {
    if !(200..300).contains(&status) {
        return Err(AuthError::Status {
            status,
            body: body.to_string(),
        });
    }

    let response: TokenResponse = serde_json::from_str(body)?;
    if let Some(expires_in) = response.expires_in {
        tracing::debug!(expires_in, "Received app access token");
    }

    response
        .access_token
        .filter(|token| !token.is_empty())
        .map(AccessToken::new)
        .ok_or(AuthError::MissingToken)
}

impl TokenIssuer for HelixClient {
    #[tracing::instrument(skip_all)]
    async fn access_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .query(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Token request failed"))?;

        let (status, body) = read_body(response).await?;
        parse_token_response(status.as_u16(), &body)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to obtain access token"))
    }
}

impl ClipSource for HelixClient {
    #[tracing::instrument(skip(self, token))]
    async fn resolve_broadcaster_id(
        &self,
        channel: &str,
        token: &AccessToken,
    ) -> Result<BroadcasterId, MetadataError> {
        let users: HelixData<HelixUser> = self
            .get("users", token, &[("login", channel.to_string())])
            .await?;

        let user = users
            .data
            .into_iter()
            .next()
            .ok_or_else(|| MetadataError::ChannelNotFound(channel.to_string()))?;
        tracing::debug!(login = %user.login, id = %user.id, "Resolved broadcaster");

        Ok(BroadcasterId::new(user.id))
    }

    fn clips_since<'a>(
        &'a self,
        broadcaster_id: &'a BroadcasterId,
        token: &'a AccessToken,
        since: DateTime<Utc>,
    ) -> BoxStream<'a, Result<ClipRecord, MetadataError>> {
        let started_at = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        tracing::debug!(%broadcaster_id, %started_at, "Fetching windowed clips");

        paginate(Self::MAX_PAGES, move |after| {
            let started_at = started_at.clone();
            async move {
                self.clip_page(broadcaster_id, token, &started_at, after)
                    .await
            }
        })
        .boxed()
    }

    #[tracing::instrument(skip(self, token))]
    async fn top_clips(
        &self,
        broadcaster_id: &BroadcasterId,
        token: &AccessToken,
        limit: u8,
    ) -> Result<Vec<ClipRecord>, MetadataError> {
        let first = limit.clamp(1, Self::MAX_PAGE_SIZE);
        let page: Page<ClipRecord> = self
            .get(
                "clips",
                token,
                &[
                    ("broadcaster_id", broadcaster_id.to_string()),
                    ("first", first.to_string()),
                ],
            )
            .await?;

        Ok(page.data)
    }
}

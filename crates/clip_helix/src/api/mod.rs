use std::future::Future;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::{AccessToken, AuthError, BroadcasterId, ClipRecord, Credentials, MetadataError};

pub mod client;

pub trait TokenIssuer {
    /// Exchanges application credentials for an app access token
    /// (OAuth client-credentials grant).
    fn access_token(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AccessToken, AuthError>> + Send;
}

pub trait ClipSource {
    /// Resolves a channel login to its broadcaster id.
    fn resolve_broadcaster_id(
        &self,
        channel: &str,
        token: &AccessToken,
    ) -> impl Future<Output = Result<BroadcasterId, MetadataError>> + Send;

    /// All clips created since `since`, following the pagination cursor lazily.
    fn clips_since<'a>(
        &'a self,
        broadcaster_id: &'a BroadcasterId,
        token: &'a AccessToken,
        since: DateTime<Utc>,
    ) -> BoxStream<'a, Result<ClipRecord, MetadataError>>;

    /// A single page of up to `limit` clips, no time filter.
    fn top_clips(
        &self,
        broadcaster_id: &BroadcasterId,
        token: &AccessToken,
        limit: u8,
    ) -> impl Future<Output = Result<Vec<ClipRecord>, MetadataError>> + Send;
}

impl<T: TokenIssuer + Send + Sync> TokenIssuer for &T {
    async fn access_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        (**self).access_token(credentials).await
    }
}

impl<T: ClipSource + Send + Sync> ClipSource for &T {
    async fn resolve_broadcaster_id(
        &self,
        channel: &str,
        token: &AccessToken,
    ) -> Result<BroadcasterId, MetadataError> {
        (**self).resolve_broadcaster_id(channel, token).await
    }

    fn clips_since<'a>(
        &'a self,
        broadcaster_id: &'a BroadcasterId,
        token: &'a AccessToken,
        since: DateTime<Utc>,
    ) -> BoxStream<'a, Result<ClipRecord, MetadataError>> {
        (**self).clips_since(broadcaster_id, token, since)
    }

    async fn top_clips(
        &self,
        broadcaster_id: &BroadcasterId,
        token: &AccessToken,
        limit: u8,
    ) -> Result<Vec<ClipRecord>, MetadataError> {
        (**self).top_clips(broadcaster_id, token, limit).await
    }
}

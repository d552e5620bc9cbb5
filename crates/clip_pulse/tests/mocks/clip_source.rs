use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use clip_helix::{AccessToken, BroadcasterId, ClipRecord, ClipSource, MetadataError};
use futures::{stream::BoxStream, StreamExt};

/// Serves canned clips per channel. Broadcaster ids are `id-<channel>`.
#[derive(Clone, Default)]
pub struct MockClipSource {
    pub clips: HashMap<String, Vec<ClipRecord>>,
    /// Channels whose clip listing fails after the id resolves
    pub failing_channels: HashSet<String>,
    pub resolve_calls: Arc<Mutex<Vec<String>>>,
    pub since_calls: Arc<Mutex<Vec<(String, DateTime<Utc>)>>>,
    pub top_calls: Arc<Mutex<Vec<(String, u8)>>>,
    pub tokens_seen: Arc<Mutex<Vec<String>>>,
}

pub fn clip(slug: &str, title: &str) -> ClipRecord {
    ClipRecord {
        id: slug.to_string(),
        url: format!("https://clips.twitch.tv/{slug}"),
        title: title.to_string(),
        created_at: None,
        broadcaster_name: String::new(),
        creator_name: String::new(),
        view_count: 0,
        duration: 30.0,
        thumbnail_url: String::new(),
    }
}

impl MockClipSource {
    pub fn with_channel(mut self, channel: &str, clips: Vec<ClipRecord>) -> Self {
        self.clips.insert(channel.to_string(), clips);
        self
    }

    pub fn with_failing_channel(mut self, channel: &str) -> Self {
        self.clips.insert(channel.to_string(), Vec::new());
        self.failing_channels.insert(channel.to_string());
        self
    }

    fn channel_of(broadcaster_id: &BroadcasterId) -> String {
        broadcaster_id
            .as_str()
            .trim_start_matches("id-")
            .to_string()
    }

    fn listing(&self, channel: &str) -> Result<Vec<ClipRecord>, MetadataError> {
        if self.failing_channels.contains(channel) {
            return Err(MetadataError::Status {
                endpoint: "clips".to_string(),
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(self.clips.get(channel).cloned().unwrap_or_default())
    }
}

impl ClipSource for MockClipSource {
    async fn resolve_broadcaster_id(
        &self,
        channel: &str,
        token: &AccessToken,
    ) -> Result<BroadcasterId, MetadataError> {
        self.resolve_calls.lock().unwrap().push(channel.to_string());
        self.tokens_seen
            .lock()
            .unwrap()
            .push(token.secret().to_string());
        if !self.clips.contains_key(channel) {
            return Err(MetadataError::ChannelNotFound(channel.to_string()));
        }
        Ok(BroadcasterId::new(format!("id-{channel}")))
    }

    fn clips_since<'a>(
        &'a self,
        broadcaster_id: &'a BroadcasterId,
        _token: &'a AccessToken,
        since: DateTime<Utc>,
    ) -> BoxStream<'a, Result<ClipRecord, MetadataError>> {
        let channel = Self::channel_of(broadcaster_id);
        self.since_calls
            .lock()
            .unwrap()
            .push((channel.clone(), since));
        match self.listing(&channel) {
            Ok(clips) => futures::stream::iter(clips.into_iter().map(Ok)).boxed(),
            Err(e) => futures::stream::once(async move { Err(e) }).boxed(),
        }
    }

    async fn top_clips(
        &self,
        broadcaster_id: &BroadcasterId,
        _token: &AccessToken,
        limit: u8,
    ) -> Result<Vec<ClipRecord>, MetadataError> {
        let channel = Self::channel_of(broadcaster_id);
        self.top_calls.lock().unwrap().push((channel.clone(), limit));
        let mut clips = self.listing(&channel)?;
        clips.truncate(usize::from(limit));
        Ok(clips)
    }
}

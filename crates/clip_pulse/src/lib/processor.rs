pub mod builder;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use clip_helix::{AccessToken, ClipRecord, ClipSource, Credentials, MetadataError, TokenIssuer};
use futures::TryStreamExt;

use crate::{
    browser::BrowserDriver,
    error::{ExtractError, PipelineError},
    extractor::{ClipExtractor, DownloadTask},
    filename::FilenamePolicy,
};

/// How many clips to take per channel, and which naming scheme they get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipLimit {
    /// Every clip created in the last `days` days, named after the clip title
    Windowed { days: u32 },
    /// The platform's top `count` clips, named after the download link
    TopK { count: u8 },
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub channels: Vec<String>,
    pub limit: ClipLimit,
    pub output_dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub channels: Vec<ChannelReport>,
}

#[derive(Debug)]
pub struct ChannelReport {
    pub channel: String,
    pub outcome: ChannelOutcome,
}

#[derive(Debug)]
pub enum ChannelOutcome {
    /// Broadcaster lookup or clip listing failed; no clip was attempted
    Skipped(MetadataError),
    Processed {
        saved: Vec<PathBuf>,
        failed: Vec<ClipFailure>,
    },
}

#[derive(Debug)]
pub struct ClipFailure {
    pub clip_url: String,
    pub title: String,
    pub error: ExtractError,
}

impl RunReport {
    pub fn channel(&self, name: &str) -> Option<&ChannelReport> {
        self.channels.iter().find(|c| c.channel == name)
    }

    pub fn saved_files(&self) -> impl Iterator<Item = &Path> {
        self.channels.iter().flat_map(|c| c.saved()).map(PathBuf::as_path)
    }

    pub fn failed_clips(&self) -> impl Iterator<Item = &ClipFailure> {
        self.channels.iter().flat_map(|c| c.failed())
    }

    pub fn skipped_channels(&self) -> impl Iterator<Item = &ChannelReport> {
        self.channels
            .iter()
            .filter(|c| matches!(c.outcome, ChannelOutcome::Skipped(_)))
    }
}

impl ChannelReport {
    pub fn saved(&self) -> &[PathBuf] {
        match &self.outcome {
            ChannelOutcome::Processed { saved, .. } => saved,
            ChannelOutcome::Skipped(_) => &[],
        }
    }

    pub fn failed(&self) -> &[ClipFailure] {
        match &self.outcome {
            ChannelOutcome::Processed { failed, .. } => failed,
            ChannelOutcome::Skipped(_) => &[],
        }
    }
}

/// Start of a `days` long window ending at `now`, clamped to the earliest
/// representable instant for windows that reach past it.
fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// Token, metadata and browser steps of the clip pipeline, run channel by channel
#[derive(Debug)]
pub struct ClipProcessor<T, C, D>
where
    T: TokenIssuer,
    C: ClipSource,
    D: BrowserDriver,
{
    credentials: Credentials,
    token_issuer: T,
    clip_source: C,
    extractor: ClipExtractor<D>,
}

impl<T, C, D> ClipProcessor<T, C, D>
where
    T: TokenIssuer,
    C: ClipSource,
    D: BrowserDriver,
{
    /// Runs the pipeline over every channel in `config`.
    ///
    /// Only an unusable output directory or a failed token exchange end the
    /// run early; channel and clip failures are logged, recorded in the
    /// returned report, and skipped.
    #[tracing::instrument(skip_all, fields(channels = config.channels.len(), limit = ?config.limit))]
    pub async fn run(&self, config: &RunConfig) -> Result<RunReport, PipelineError> {
        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|source| PipelineError::OutputDir {
                path: config.output_dir.clone(),
                source,
            })?;

        tracing::info!("Authenticating with Twitch API");
        let token = self
            .token_issuer
            .access_token(&self.credentials)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to authenticate"))?;

        let mut report = RunReport::default();
        for channel in &config.channels {
            let outcome = self.process_channel(channel, &token, config).await;
            report.channels.push(ChannelReport {
                channel: channel.clone(),
                outcome,
            });
        }

        Ok(report)
    }

    #[tracing::instrument(skip(self, token, config))]
    async fn process_channel(
        &self,
        channel: &str,
        token: &AccessToken,
        config: &RunConfig,
    ) -> ChannelOutcome {
        tracing::info!("Processing channel");

        let clips = match self.fetch_clips(channel, token, config.limit).await {
            Ok(clips) => clips,
            Err(error) => {
                tracing::error!(error = %error, "Skipping channel");
                return ChannelOutcome::Skipped(error);
            }
        };

        if clips.is_empty() {
            tracing::info!("No clips found");
        } else {
            tracing::info!(count = clips.len(), "Found clips");
        }

        let mut saved = Vec::new();
        let mut failed = Vec::new();
        for clip in clips {
            let task = DownloadTask {
                clip_url: clip.url.clone(),
                destination: config.output_dir.clone(),
                policy: match config.limit {
                    ClipLimit::Windowed { .. } => {
                        FilenamePolicy::FromTitle(format!("{channel}_{}", clip.title))
                    }
                    ClipLimit::TopK { .. } => FilenamePolicy::FromDownloadUrl,
                },
            };

            match self.extractor.extract_and_save(&task).await {
                Ok(path) => saved.push(path),
                Err(error) => {
                    tracing::error!(clip_url = %clip.url, error = %error, "Failed to download clip");
                    failed.push(ClipFailure {
                        clip_url: clip.url,
                        title: clip.title,
                        error,
                    });
                }
            }
        }

        ChannelOutcome::Processed { saved, failed }
    }

    async fn fetch_clips(
        &self,
        channel: &str,
        token: &AccessToken,
        limit: ClipLimit,
    ) -> Result<Vec<ClipRecord>, MetadataError> {
        let broadcaster_id = self
            .clip_source
            .resolve_broadcaster_id(channel, token)
            .await?;
        tracing::debug!(%broadcaster_id, "Resolved broadcaster");

        match limit {
            ClipLimit::Windowed { days } => {
                let since = window_start(Utc::now(), days);
                self.clip_source
                    .clips_since(&broadcaster_id, token, since)
                    .try_collect()
                    .await
            }
            ClipLimit::TopK { count } => {
                self.clip_source
                    .top_clips(&broadcaster_id, token, count)
                    .await
            }
        }
    }
}

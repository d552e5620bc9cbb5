use std::{path::PathBuf, time::Duration};

use clip_helix::AuthError;

use crate::browser::UiIntent;

/// Why a single clip could not be saved. Always local to that clip.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to start browser session: {0:#}")]
    Launch(anyhow::Error),
    #[error("Failed to navigate to {url}: {reason:#}")]
    Navigation { url: String, reason: anyhow::Error },
    #[error("{intent} did not appear within {timeout:?}")]
    UiElementNotFound { intent: UiIntent, timeout: Duration },
    #[error("Failed to activate {intent}: {reason:#}")]
    Interaction {
        intent: UiIntent,
        reason: anyhow::Error,
    },
    #[error("No usable download link on {url}")]
    DownloadLinkMissing { url: String },
    #[error("Download did not complete: {0:#}")]
    Transfer(anyhow::Error),
    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failures that end the whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

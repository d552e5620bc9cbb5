use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    browser::{BrowserDriver, BrowserSession, DownloadWaiter, UiIntent},
    error::ExtractError,
    filename::FilenamePolicy,
};

#[derive(Debug, Clone, Copy)]
pub struct ExtractTimeouts {
    pub navigation: Duration,
    /// Per UI element wait
    pub ui: Duration,
    pub download: Duration,
}

impl Default for ExtractTimeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            ui: Duration::from_secs(10),
            download: Duration::from_secs(120),
        }
    }
}

/// One clip to save.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub clip_url: String,
    pub destination: PathBuf,
    pub policy: FilenamePolicy,
}

/// Saves clips by walking the clip page's share menu in a throwaway browser.
#[derive(Debug)]
pub struct ClipExtractor<D> {
    driver: D,
    timeouts: ExtractTimeouts,
}

impl<D: BrowserDriver> ClipExtractor<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            timeouts: ExtractTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: ExtractTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Launches a fresh browser for `task`, saves the clip and returns its path.
    ///
    /// The browser is closed on every path out of here, including failures.
    #[tracing::instrument(skip(self, task), fields(clip_url = %task.clip_url))]
    pub async fn extract_and_save(&self, task: &DownloadTask) -> Result<PathBuf, ExtractError> {
        // holds the browser profile and in-flight downloads; removed on drop
        let staging = tempfile::tempdir().map_err(|e| ExtractError::Launch(e.into()))?;

        let mut session = self
            .driver
            .launch(staging.path())
            .await
            .map_err(ExtractError::Launch)?;

        let result = self.drive(&mut session, task).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = ?e, "Failed to close browser session");
        }

        result
    }

    async fn drive(
        &self,
        session: &mut D::Session,
        task: &DownloadTask,
    ) -> Result<PathBuf, ExtractError> {
        let url = task.clip_url.as_str();

        tracing::debug!("Opening clip page");
        session
            .navigate(url, self.timeouts.navigation)
            .await
            .map_err(|reason| ExtractError::Navigation {
                url: url.to_string(),
                reason,
            })?;

        let share = self.locate(session, UiIntent::ShareButton).await?;
        activate(&*session, &share, UiIntent::ShareButton).await?;

        let link = self.locate(session, UiIntent::DownloadLandscape).await?;
        let href = session
            .href(&link)
            .await
            .inspect_err(|e| tracing::warn!(error = ?e, "Failed to read download link"))
            .ok()
            .flatten()
            .filter(|href| !href.trim().is_empty());
        let missing_link = || ExtractError::DownloadLinkMissing {
            url: url.to_string(),
        };
        let href = href.ok_or_else(missing_link)?;
        let filename = task.policy.resolve(&href, url).ok_or_else(missing_link)?;

        // listener goes in before the click, or a fast download is missed
        let waiter = session
            .await_download()
            .await
            .map_err(ExtractError::Transfer)?;
        activate(&*session, &link, UiIntent::DownloadLandscape).await?;
        tracing::info!(%filename, "Downloading clip");

        let download = waiter
            .wait(self.timeouts.download)
            .await
            .map_err(ExtractError::Transfer)?;

        let path = task.destination.join(&filename);
        persist(&download.path, &path).await?;
        tracing::info!(
            path = %path.display(),
            source_url = %download.url,
            suggested_filename = %download.suggested_filename,
            "Saved clip"
        );

        Ok(path)
    }

    async fn locate(
        &self,
        session: &D::Session,
        intent: UiIntent,
    ) -> Result<<D::Session as BrowserSession>::Handle, ExtractError> {
        let timeout = self.timeouts.ui;
        session.locate(intent, timeout).await.map_err(|e| {
            tracing::warn!(error = %e, %intent, "UI element not found, page markup may have changed");
            ExtractError::UiElementNotFound { intent, timeout }
        })
    }
}

async fn activate<S: BrowserSession>(
    session: &S,
    handle: &S::Handle,
    intent: UiIntent,
) -> Result<(), ExtractError> {
    session
        .activate(handle)
        .await
        .map_err(|reason| ExtractError::Interaction { intent, reason })
}

/// Copies a finished transfer to its final location, replacing any previous file.
async fn persist(staged: &Path, path: &Path) -> Result<(), ExtractError> {
    tokio::fs::copy(staged, path)
        .await
        .map(|_| ())
        .map_err(|source| ExtractError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

pub mod chromium;

use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

/// What the extractor is looking for on a clip page.
///
/// Backends translate an intent into whatever selector their engine
/// understands; the clip page markup is undocumented and changes without
/// notice, so selectors live with the backend, not with the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiIntent {
    ShareButton,
    DownloadLandscape,
}

impl UiIntent {
    pub fn label(&self) -> &'static str {
        match self {
            UiIntent::ShareButton => "Share",
            UiIntent::DownloadLandscape => "Download Landscape Version",
        }
    }
}

impl fmt::Display for UiIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" control", self.label())
    }
}

/// A finished file transfer captured by the browser.
#[derive(Debug, Clone)]
pub struct Download {
    pub url: String,
    pub suggested_filename: String,
    /// Where the browser left the completed file
    pub path: PathBuf,
}

pub trait BrowserDriver {
    type Session: BrowserSession;

    /// Starts an isolated browser whose profile and downloads live in `staging_dir`.
    fn launch(&self, staging_dir: &Path) -> impl Future<Output = anyhow::Result<Self::Session>>;
}

pub trait BrowserSession {
    type Handle;
    type Waiter: DownloadWaiter;

    fn navigate(&mut self, url: &str, timeout: Duration) -> impl Future<Output = anyhow::Result<()>>;

    /// Waits until the element for `intent` is present and interactable.
    fn locate(
        &self,
        intent: UiIntent,
        timeout: Duration,
    ) -> impl Future<Output = anyhow::Result<Self::Handle>>;

    fn activate(&self, handle: &Self::Handle) -> impl Future<Output = anyhow::Result<()>>;

    fn href(&self, handle: &Self::Handle) -> impl Future<Output = anyhow::Result<Option<String>>>;

    /// Registers interest in the next download. Must be called before the
    /// action that starts it, otherwise the event can be missed.
    fn await_download(&self) -> impl Future<Output = anyhow::Result<Self::Waiter>>;

    fn close(self) -> impl Future<Output = anyhow::Result<()>>;
}

pub trait DownloadWaiter {
    fn wait(self, timeout: Duration) -> impl Future<Output = anyhow::Result<Download>>;
}

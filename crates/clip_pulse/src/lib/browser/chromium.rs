use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, bail, Context};
use chromiumoxide::{
    cdp::browser_protocol::{
        browser::{
            DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
            SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
        },
        target::{CreateBrowserContextParams, CreateTargetParams},
    },
    listeners::EventStream,
    Browser, BrowserConfig, Element, Page,
};
use futures::StreamExt;
use tokio::{task::JoinHandle, time::Instant};

use super::{BrowserDriver, BrowserSession, Download, DownloadWaiter, UiIntent};

/// Drives a local Chromium through the Chrome DevTools Protocol.
#[derive(Debug, Clone, Default)]
pub struct ChromiumDriver {
    headful: bool,
    executable: Option<PathBuf>,
}

impl ChromiumDriver {
    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::default()
    }

    /// Show the browser window instead of running headless
    pub fn headful(mut self, headful: bool) -> Self {
        self.headful = headful;
        self
    }

    pub fn executable(mut self, path: Option<PathBuf>) -> Self {
        self.executable = path;
        self
    }
}

impl BrowserDriver for ChromiumDriver {
    type Session = ChromiumSession;

    #[tracing::instrument(skip(self))]
    async fn launch(&self, staging_dir: &Path) -> anyhow::Result<ChromiumSession> {
        let downloads = staging_dir.join("downloads");
        tokio::fs::create_dir_all(&downloads)
            .await
            .context("Failed to create download staging directory")?;

        let mut builder = BrowserConfig::builder().user_data_dir(staging_dir.join("profile"));
        if self.headful {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|e| anyhow!(e))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = ?e, "Browser handler error");
                }
            }
        });

        // a session that fails half-way still has to shut its browser down
        match open_page(&mut browser, &downloads).await {
            Ok(page) => Ok(ChromiumSession {
                browser,
                handler,
                page,
                downloads,
            }),
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                Err(e)
            }
        }
    }
}

/// Opens a page in a fresh browser context with downloads routed to `downloads`.
async fn open_page(browser: &mut Browser, downloads: &Path) -> anyhow::Result<Page> {
    let context_id = browser
        .create_browser_context(CreateBrowserContextParams::default())
        .await
        .context("Failed to create browser context")?;

    let behavior = SetDownloadBehaviorParams::builder()
        .behavior(SetDownloadBehaviorBehavior::AllowAndName)
        .browser_context_id(context_id.clone())
        .download_path(downloads.to_string_lossy().into_owned())
        .events_enabled(true)
        .build()
        .map_err(|e| anyhow!(e))?;
    browser
        .execute(behavior)
        .await
        .context("Failed to configure downloads")?;

    let target = CreateTargetParams::builder()
        .url("about:blank")
        .browser_context_id(context_id)
        .build()
        .map_err(|e| anyhow!(e))?;
    browser
        .new_page(target)
        .await
        .context("Failed to open page")
}

pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    downloads: PathBuf,
}

impl UiIntent {
    fn xpath(&self) -> &'static str {
        match self {
            UiIntent::ShareButton => r#"//button[contains(normalize-space(.), "Share")]"#,
            UiIntent::DownloadLandscape => {
                r#"//a[contains(normalize-space(.), "Download Landscape Version")]"#
            }
        }
    }
}

impl BrowserSession for ChromiumSession {
    type Handle = Element;
    type Waiter = ChromiumDownload;

    async fn navigate(&mut self, url: &str, timeout: Duration) -> anyhow::Result<()> {
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .with_context(|| format!("Timed out after {timeout:?}"))??;
        Ok(())
    }

    async fn locate(&self, intent: UiIntent, timeout: Duration) -> anyhow::Result<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_xpath(intent.xpath()).await {
                if element.scroll_into_view().await.is_ok() {
                    return Ok(element);
                }
            }
            if Instant::now() >= deadline {
                bail!("{intent} not found within {timeout:?}");
            }
            tokio::time::sleep(ChromiumDriver::POLL_INTERVAL).await;
        }
    }

    async fn activate(&self, handle: &Element) -> anyhow::Result<()> {
        handle.click().await?;
        Ok(())
    }

    async fn href(&self, handle: &Element) -> anyhow::Result<Option<String>> {
        Ok(handle.attribute("href").await?)
    }

    async fn await_download(&self) -> anyhow::Result<ChromiumDownload> {
        let will_begin = self
            .browser
            .event_listener::<EventDownloadWillBegin>()
            .await?;
        let progress = self
            .browser
            .event_listener::<EventDownloadProgress>()
            .await?;

        Ok(ChromiumDownload {
            will_begin,
            progress,
            downloads: self.downloads.clone(),
        })
    }

    async fn close(mut self) -> anyhow::Result<()> {
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed.context("Failed to close browser")?;
        Ok(())
    }
}

pub struct ChromiumDownload {
    will_begin: EventStream<EventDownloadWillBegin>,
    progress: EventStream<EventDownloadProgress>,
    downloads: PathBuf,
}

impl ChromiumDownload {
    async fn transfer(mut self) -> anyhow::Result<Download> {
        let started = self
            .will_begin
            .next()
            .await
            .context("Browser went away before the download started")?;
        tracing::debug!(url = %started.url, guid = %started.guid, "Download started");

        while let Some(progress) = self.progress.next().await {
            if progress.guid != started.guid {
                continue;
            }
            match progress.state {
                DownloadProgressState::Completed => {
                    return Ok(Download {
                        url: started.url.clone(),
                        suggested_filename: started.suggested_filename.clone(),
                        // AllowAndName stores the file under its guid
                        path: self.downloads.join(&started.guid),
                    })
                }
                DownloadProgressState::Canceled => bail!("Download was canceled"),
                _ => {}
            }
        }
        bail!("Browser went away before the download completed")
    }
}

impl DownloadWaiter for ChromiumDownload {
    async fn wait(self, timeout: Duration) -> anyhow::Result<Download> {
        tokio::time::timeout(timeout, self.transfer())
            .await
            .with_context(|| format!("Download did not complete within {timeout:?}"))?
    }
}

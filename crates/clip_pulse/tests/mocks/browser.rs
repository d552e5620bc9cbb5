use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use clip_pulse::browser::{BrowserDriver, BrowserSession, Download, DownloadWaiter, UiIntent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    Launch,
    Navigate(String),
    Locate(UiIntent),
    Activate(UiIntent),
    AwaitDownload,
    Close,
}

/// What a clip page does when the extractor walks it.
#[derive(Debug, Clone)]
pub enum ClipPage {
    Downloads { href: String, contents: String },
    NavigationFails,
    ShareMissing,
    HrefMissing,
    /// Reading the link's `href` fails in the backend
    HrefUnreadable,
    DownloadStalls,
}

#[derive(Clone, Default)]
pub struct MockDriver {
    pub pages: HashMap<String, ClipPage>,
    pub fail_launch: bool,
    pub events: Arc<Mutex<Vec<BrowserEvent>>>,
    pub staging_dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockDriver {
    pub fn with_page(mut self, url: &str, page: ClipPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Default::default()
        }
    }

    pub fn count(&self, event: &BrowserEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| *e == event)
            .count()
    }
}

pub struct MockSession {
    pages: HashMap<String, ClipPage>,
    current: Option<ClipPage>,
    staging: PathBuf,
    events: Arc<Mutex<Vec<BrowserEvent>>>,
}

impl MockSession {
    fn record(&self, event: BrowserEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl BrowserDriver for MockDriver {
    type Session = MockSession;

    async fn launch(&self, staging_dir: &Path) -> anyhow::Result<MockSession> {
        if self.fail_launch {
            anyhow::bail!("chrome executable not found");
        }
        self.events.lock().unwrap().push(BrowserEvent::Launch);
        self.staging_dirs
            .lock()
            .unwrap()
            .push(staging_dir.to_path_buf());
        Ok(MockSession {
            pages: self.pages.clone(),
            current: None,
            staging: staging_dir.to_path_buf(),
            events: self.events.clone(),
        })
    }
}

impl BrowserSession for MockSession {
    type Handle = UiIntent;
    type Waiter = MockWaiter;

    async fn navigate(&mut self, url: &str, _timeout: Duration) -> anyhow::Result<()> {
        self.record(BrowserEvent::Navigate(url.to_string()));
        let page = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 for {url}"))?;
        if let ClipPage::NavigationFails = page {
            anyhow::bail!("net::ERR_NAME_NOT_RESOLVED");
        }
        self.current = Some(page);
        Ok(())
    }

    async fn locate(&self, intent: UiIntent, _timeout: Duration) -> anyhow::Result<UiIntent> {
        self.record(BrowserEvent::Locate(intent));
        match (&self.current, intent) {
            (Some(ClipPage::ShareMissing), UiIntent::ShareButton) | (None, _) => {
                anyhow::bail!("no element matched")
            }
            _ => Ok(intent),
        }
    }

    async fn activate(&self, handle: &UiIntent) -> anyhow::Result<()> {
        self.record(BrowserEvent::Activate(*handle));
        Ok(())
    }

    async fn href(&self, _handle: &UiIntent) -> anyhow::Result<Option<String>> {
        if let Some(ClipPage::HrefUnreadable) = self.current {
            anyhow::bail!("Cannot find context with specified id");
        }
        Ok(match &self.current {
            Some(ClipPage::Downloads { href, .. }) => Some(href.clone()),
            Some(ClipPage::DownloadStalls) => Some("https://cdn.example/stall.mp4".to_string()),
            _ => None,
        })
    }

    async fn await_download(&self) -> anyhow::Result<MockWaiter> {
        self.record(BrowserEvent::AwaitDownload);
        Ok(MockWaiter {
            page: self.current.clone(),
            downloads: self.staging.join("downloads"),
        })
    }

    async fn close(self) -> anyhow::Result<()> {
        self.record(BrowserEvent::Close);
        Ok(())
    }
}

pub struct MockWaiter {
    page: Option<ClipPage>,
    downloads: PathBuf,
}

impl DownloadWaiter for MockWaiter {
    async fn wait(self, _timeout: Duration) -> anyhow::Result<Download> {
        let Some(ClipPage::Downloads { href, contents }) = self.page else {
            anyhow::bail!("download did not start");
        };
        tokio::fs::create_dir_all(&self.downloads).await?;
        let path = self.downloads.join("3f2a-guid");
        tokio::fs::write(&path, contents).await?;
        Ok(Download {
            url: href,
            suggested_filename: "clip.mp4".to_string(),
            path,
        })
    }
}

use url::Url;

pub const VIDEO_EXTENSION: &str = "mp4";

/// How the saved file for a clip gets its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenamePolicy {
    /// Sanitized title plus the video extension (windowed batch runs)
    FromTitle(String),
    /// Basename of the download link's path (interactive top-K runs)
    FromDownloadUrl,
}

impl FilenamePolicy {
    /// Resolves the filename once the download link is known.
    ///
    /// `href` may be relative to `page_url`. Returns `None` when the policy
    /// cannot derive a name from the link.
    pub fn resolve(&self, href: &str, page_url: &str) -> Option<String> {
        match self {
            FilenamePolicy::FromTitle(title) => Some(title_filename(title)),
            FilenamePolicy::FromDownloadUrl => url_basename(href, page_url),
        }
    }
}

/// Keeps `[A-Za-z0-9 _-]` and replaces every other character with `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn title_filename(title: &str) -> String {
    let name = sanitize_title(title);
    let name = if name.trim().is_empty() {
        "untitled".to_string()
    } else {
        name
    };
    format!("{name}.{VIDEO_EXTENSION}")
}

fn url_basename(href: &str, page_url: &str) -> Option<String> {
    let url = Url::parse(href)
        .or_else(|_| Url::parse(page_url).and_then(|base| base.join(href)))
        .ok()?;

    let basename = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .filter(|segment| *segment != "." && *segment != "..")
        .map(str::to_string);
    basename
}

//! Building same-origin links embedded in feeds

pub const RSS_ROUTE: &str = "/rss/youtube";
pub const MEDIA_ROUTE: &str = "/media/youtube";
pub const THUMBNAIL_ROUTE: &str = "/thumbnail";

/// File extension appended to enclosure URLs; podcast apps rely on it
pub const AUDIO_EXTENSION: &str = ".m4a";

/// How resource links are decorated for the current deployment
#[derive(Debug, Clone, Default)]
pub struct Links {
    trusted_hosts: Vec<String>,
    /// Set only when query-parameter auth is enabled and links should carry it
    auth_key: Option<String>,
}

impl Links {
    pub fn new(trusted_hosts: Vec<String>, auth_key: Option<String>) -> Self {
        Self {
            trusted_hosts,
            auth_key,
        }
    }

    /// Whether resource links carry the `key` query parameter
    pub fn is_decorated(&self) -> bool {
        self.auth_key.is_some()
    }

    /// Whether requests must name one of the trusted hosts
    pub fn restricts_hosts(&self) -> bool {
        !self.trusted_hosts.is_empty()
    }

    /// Whether `host` is the authority of a trusted origin
    pub fn is_trusted_host(&self, host: &str) -> bool {
        self.trusted_origin(host).is_some()
    }

    /// Host to render feeds for
    ///
    /// Empty unless `requested_host` is trusted: links then stay relative,
    /// so every such request gets the same document.
    pub fn effective_host<'a>(&self, requested_host: &'a str) -> &'a str {
        if self.is_trusted_host(requested_host) {
            requested_host
        } else {
            ""
        }
    }

    fn trusted_origin(&self, host: &str) -> Option<&str> {
        if host.is_empty() {
            return None;
        }
        self.trusted_hosts
            .iter()
            .find(|origin| {
                let origin = origin.trim_end_matches('/');
                origin.strip_prefix("https://") == Some(host)
                    || origin.strip_prefix("http://") == Some(host)
            })
            .map(|origin| origin.trim_end_matches('/'))
    }

    /// Relative URL of a stored thumbnail
    pub fn thumbnail_path(&self, key: &str) -> String {
        self.decorate(format!("{}/{}", THUMBNAIL_ROUTE, urlencoding::encode(key)))
    }

    /// Relative URL of a video's audio, including the file extension
    pub fn media_path(&self, video_id: &str) -> String {
        self.decorate(format!(
            "{}/{}{}",
            MEDIA_ROUTE,
            urlencoding::encode(video_id),
            AUDIO_EXTENSION
        ))
    }

    fn decorate(&self, path: String) -> String {
        match &self.auth_key {
            Some(key) => format!("{}?key={}", path, urlencoding::encode(key)),
            None => path,
        }
    }

    /// Prefix a relative URL with the trusted origin matching `host`
    ///
    /// Absolute URLs and hosts that match no trusted origin are returned
    /// unchanged.
    pub fn absolute(&self, url: &str, host: &str) -> String {
        if is_absolute(url) {
            return url.to_string();
        }
        match self.trusted_origin(host) {
            Some(origin) => format!("{}{}", origin, url),
            None => url.to_string(),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|u| u.has_host())
}

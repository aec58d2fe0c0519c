//! Cache keys, one type per cached operation
//!
//! Each key carries exactly the fields its cached output depends on. Episode
//! lists and logos are host-independent; rendered documents embed absolute
//! links and so also vary by requesting host.

/// Key of a playlist's canonical episode list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EpisodeListKey {
    playlist_id: String,
}

impl EpisodeListKey {
    pub fn new(playlist_id: &str) -> Self {
        Self {
            playlist_id: playlist_id.to_string(),
        }
    }
}

/// Key of a playlist's resolved logo URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogoKey {
    playlist_id: String,
}

impl LogoKey {
    pub fn new(playlist_id: &str) -> Self {
        Self {
            playlist_id: playlist_id.to_string(),
        }
    }
}

/// Key of a rendered feed document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedDocumentKey {
    playlist_id: String,
    host: String,
}

impl FeedDocumentKey {
    pub fn new(playlist_id: &str, host: &str) -> Self {
        Self {
            playlist_id: playlist_id.to_string(),
            host: host.to_string(),
        }
    }
}

/// Single-flight key of an audio download: the upstream-confirmed video ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadKey {
    video_id: String,
}

impl DownloadKey {
    pub fn new(validated_video_id: &str) -> Self {
        Self {
            video_id: validated_video_id.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.video_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_varies_by_host() {
        assert_ne!(
            FeedDocumentKey::new("abc", "a.com"),
            FeedDocumentKey::new("abc", "b.com")
        );
        assert_ne!(
            FeedDocumentKey::new("abc", "a.com"),
            FeedDocumentKey::new("abd", "a.com")
        );
        assert_eq!(
            FeedDocumentKey::new("abc", "a.com"),
            FeedDocumentKey::new("abc", "a.com")
        );
    }

    #[test]
    fn test_playlist_keys_ignore_field_boundaries() {
        // ("ab", "c") and ("a", "bc") must not collide
        assert_ne!(
            FeedDocumentKey::new("ab", "c"),
            FeedDocumentKey::new("a", "bc")
        );
    }

    #[test]
    fn test_playlist_scoped_keys() {
        assert_eq!(EpisodeListKey::new("abc"), EpisodeListKey::new("abc"));
        assert_ne!(EpisodeListKey::new("abc"), EpisodeListKey::new("xyz"));
        assert_eq!(LogoKey::new("abc"), LogoKey::new("abc"));
    }

    #[test]
    fn test_download_key_is_the_video_id() {
        assert_eq!(DownloadKey::new("dQw4w9WgXcQ").as_str(), "dQw4w9WgXcQ");
    }
}

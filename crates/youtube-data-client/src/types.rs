//! Data types for YouTube Data API v3 responses
//!
//! Only the fields this crate's callers read are modelled; everything else in
//! the API responses is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Privacy statuses that make a playlist item unplayable for anonymous clients
const UNAVAILABLE_STATUSES: [&str; 2] = ["private", "privacyStatusUnspecified"];

/// Generic `*.list` response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Thumbnail variants keyed by size name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// The `maxres` variant when present, otherwise `default`
    pub fn best_url(&self) -> Option<&str> {
        self.maxres
            .as_ref()
            .or(self.default.as_ref())
            .map(|t| t.url.as_str())
    }
}

/// Entry from `GET /playlists`
#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Entry from `GET /channels`
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    pub snippet: ChannelSnippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Entry from `GET /playlistItems`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
    pub status: Option<PlaylistItemStatus>,
}

impl PlaylistItem {
    /// Whether the referenced video can be played by anyone with the link
    pub fn is_available(&self) -> bool {
        match &self.status {
            Some(status) => !UNAVAILABLE_STATUSES.contains(&status.privacy_status.as_str()),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub channel_id: String,
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    pub published_at: DateTime<Utc>,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemStatus {
    pub privacy_status: String,
}

/// Entry from `GET /videos?part=id`
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub id: String,
}

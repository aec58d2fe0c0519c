//! Domain types shared by the feed and media paths

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Channel that owns a playlist or uploaded a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub channel_id: String,
}

/// A playlist as reported by the metadata provider
#[derive(Debug, Clone)]
pub struct PlaylistIdentity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: Author,
    pub icon_url: Option<String>,
}

/// Channel details needed to resolve a fallback logo
#[derive(Debug, Clone)]
pub struct ChannelDetails {
    pub id: String,
    pub title: String,
    pub icon_url: Option<String>,
}

/// One playable video of a playlist
#[derive(Debug, Clone)]
pub struct EpisodeDetails {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub author: Author,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Per-playlist podcast metadata configured by the operator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodcastOverrides {
    pub itunes_id: Option<u64>,
    pub language: Option<String>,
    pub explicit: Option<bool>,
    pub itunes_category: Option<String>,
    pub description: Option<String>,
}

/// Per-request presentation options for a rendered feed
#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    /// Requesting host, or empty when no trusted hosts are configured
    pub host: String,
    pub overrides: Option<PodcastOverrides>,
}

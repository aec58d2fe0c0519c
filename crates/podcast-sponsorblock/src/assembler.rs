//! Playlist feed assembly: identity, canonical episode list and logo
//!
//! The playlist identity is fetched fresh on every call so that a deleted
//! playlist stops resolving immediately. Episode lists and logos do not depend
//! on the requesting host and are cached per playlist ID.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use flight_cache::{FlightCache, FlightError};
use tracing::{debug, info};

use crate::keys::{EpisodeListKey, LogoKey};
use crate::links::Links;
use crate::models::{EpisodeDetails, PlaylistIdentity};
use crate::provider::{MetadataProvider, ProviderError};
use crate::render::RenderError;
use crate::thumbnails::ThumbnailStore;

/// Failure to produce a feed
#[derive(Debug, Clone)]
pub enum FeedError {
    /// The upstream confirmed the playlist does not exist
    PlaylistNotFound(String),
    /// The metadata provider failed or returned unusable data
    Upstream(String),
    /// The feed document could not be written
    Render(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaylistNotFound(id) => write!(f, "Playlist not found: {}", id),
            Self::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            Self::Render(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {}

impl From<ProviderError> for FeedError {
    fn from(e: ProviderError) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl From<RenderError> for FeedError {
    fn from(e: RenderError) -> Self {
        Self::Render(e.to_string())
    }
}

impl From<FlightError<ProviderError>> for FeedError {
    fn from(e: FlightError<ProviderError>) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl From<FlightError<FeedError>> for FeedError {
    fn from(e: FlightError<FeedError>) -> Self {
        match e {
            FlightError::Compute(shared) => shared.as_ref().clone(),
            FlightError::Join(join) => Self::Upstream(format!("Feed task failed: {}", join)),
        }
    }
}

/// Everything a feed is rendered from, except per-request options
#[derive(Debug, Clone)]
pub struct AssembledFeed {
    pub playlist: PlaylistIdentity,
    pub episodes: Arc<Vec<EpisodeDetails>>,
    pub logo_url: Arc<str>,
}

/// Deduplicate by video ID keeping the first occurrence, then sort by
/// publication time; ties keep upstream order
pub fn canonical_episodes(episodes: Vec<EpisodeDetails>) -> Vec<EpisodeDetails> {
    let mut seen = HashSet::new();
    let mut unique: Vec<EpisodeDetails> = episodes
        .into_iter()
        .filter(|e| seen.insert(e.video_id.clone()))
        .collect();
    unique.sort_by_key(|e| e.published_at);
    unique
}

pub struct FeedAssembler {
    provider: Arc<dyn MetadataProvider>,
    thumbnails: Arc<ThumbnailStore>,
    links: Arc<Links>,
    episodes: FlightCache<EpisodeListKey, Arc<Vec<EpisodeDetails>>>,
    logos: FlightCache<LogoKey, Arc<str>>,
    ttl: Duration,
}

impl FeedAssembler {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        thumbnails: Arc<ThumbnailStore>,
        links: Arc<Links>,
        ttl: Duration,
        cache_capacity: u64,
    ) -> Self {
        Self {
            provider,
            thumbnails,
            links,
            episodes: FlightCache::new("episode_lists", cache_capacity),
            logos: FlightCache::new("logos", cache_capacity),
            ttl,
        }
    }

    /// Fetch the playlist's identity, never from cache
    pub async fn identify(&self, playlist_id: &str) -> Result<PlaylistIdentity, FeedError> {
        self.provider
            .get_playlist(playlist_id)
            .await?
            .ok_or_else(|| FeedError::PlaylistNotFound(playlist_id.to_string()))
    }

    /// Episodes and logo for an identified playlist
    pub async fn assemble(&self, playlist: PlaylistIdentity) -> Result<AssembledFeed, FeedError> {
        let (episodes, logo_url) = tokio::try_join!(self.episodes(&playlist), self.logo(&playlist))?;
        Ok(AssembledFeed {
            playlist,
            episodes,
            logo_url,
        })
    }

    /// Canonical episode list, cached per playlist ID
    pub async fn episodes(
        &self,
        playlist: &PlaylistIdentity,
    ) -> Result<Arc<Vec<EpisodeDetails>>, FeedError> {
        let provider = self.provider.clone();
        let playlist_id = playlist.id.clone();

        let episodes = self
            .episodes
            .get_or_compute(EpisodeListKey::new(&playlist.id), self.ttl, async move {
                let items = provider.list_playlist_items(&playlist_id).await?;
                let episodes = canonical_episodes(items);
                info!(playlist_id = %playlist_id, count = episodes.len(), "Fetched episode list");
                Ok::<_, ProviderError>(Arc::new(episodes))
            })
            .await?;
        Ok(episodes)
    }

    /// Logo URL, cached per playlist ID
    ///
    /// A stored thumbnail wins, then the owning channel's icon, then the
    /// playlist's own thumbnail.
    pub async fn logo(&self, playlist: &PlaylistIdentity) -> Result<Arc<str>, FeedError> {
        let provider = self.provider.clone();
        let thumbnails = self.thumbnails.clone();
        let links = self.links.clone();
        let playlist = playlist.clone();
        let key = LogoKey::new(&playlist.id);

        let logo = self
            .logos
            .get_or_compute(key, self.ttl, async move {
                if thumbnails.find(&playlist.id).await.is_some() {
                    debug!(playlist_id = %playlist.id, "Using stored thumbnail as logo");
                    return Ok(Arc::from(links.thumbnail_path(&playlist.id)));
                }

                let channel = provider.get_channel(&playlist.author.channel_id).await?;
                if let Some(channel) = &channel {
                    debug!(channel_id = %channel.id, channel = %channel.title, "Using channel icon as logo");
                }
                channel
                    .and_then(|c| c.icon_url)
                    .or(playlist.icon_url)
                    .map(Arc::from)
                    .ok_or_else(|| {
                        ProviderError::Unavailable(format!("No logo for playlist {}", playlist.id))
                    })
            })
            .await?;
        Ok(logo)
    }

    /// Live (episode list, logo) entry counts
    pub fn cache_sizes(&self) -> (u64, u64) {
        (self.episodes.entry_count(), self.logos.entry_count())
    }
}

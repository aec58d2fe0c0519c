//! Playlist, channel and video metadata

use std::fmt;

use async_trait::async_trait;
use youtube_data_client::{PlaylistItem, YoutubeClient, YoutubeError};

use crate::models::{Author, ChannelDetails, EpisodeDetails, PlaylistIdentity};

/// Errors from the metadata provider
#[derive(Debug)]
pub enum ProviderError {
    Youtube(YoutubeError),
    /// The upstream answered but lacks what was asked for
    Unavailable(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Youtube(e) => write!(f, "{}", e),
            Self::Unavailable(msg) => write!(f, "Metadata provider unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Youtube(e) => Some(e),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<YoutubeError> for ProviderError {
    fn from(e: YoutubeError) -> Self {
        Self::Youtube(e)
    }
}

/// Source of playlist, channel and video metadata
///
/// `Ok(None)` means the upstream confirmed the resource does not exist;
/// `Err` means the upstream could not be asked.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn get_playlist(
        &self,
        playlist_id: &str,
    ) -> Result<Option<PlaylistIdentity>, ProviderError>;

    async fn get_channel(&self, channel_id: &str)
        -> Result<Option<ChannelDetails>, ProviderError>;

    /// Every playable item of the playlist, in upstream order
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<EpisodeDetails>, ProviderError>;

    /// The canonical ID of an existing video
    async fn find_video(&self, video_id: &str) -> Result<Option<String>, ProviderError>;
}

#[async_trait]
impl MetadataProvider for YoutubeClient {
    async fn get_playlist(
        &self,
        playlist_id: &str,
    ) -> Result<Option<PlaylistIdentity>, ProviderError> {
        let playlist = YoutubeClient::get_playlist(self, playlist_id).await?;
        Ok(playlist.map(|p| PlaylistIdentity {
            icon_url: p.snippet.thumbnails.best_url().map(str::to_string),
            id: p.id,
            title: p.snippet.title,
            description: p.snippet.description,
            author: Author {
                name: p.snippet.channel_title,
                channel_id: p.snippet.channel_id,
            },
        }))
    }

    async fn get_channel(
        &self,
        channel_id: &str,
    ) -> Result<Option<ChannelDetails>, ProviderError> {
        let channel = YoutubeClient::get_channel(self, channel_id).await?;
        Ok(channel.map(|c| ChannelDetails {
            icon_url: c.snippet.thumbnails.best_url().map(str::to_string),
            id: c.id,
            title: c.snippet.title,
        }))
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<EpisodeDetails>, ProviderError> {
        let items = YoutubeClient::list_playlist_items(self, playlist_id).await?;
        Ok(items
            .into_iter()
            .filter(PlaylistItem::is_available)
            .map(episode_from_item)
            .collect())
    }

    async fn find_video(&self, video_id: &str) -> Result<Option<String>, ProviderError> {
        let video = YoutubeClient::get_video(self, video_id).await?;
        Ok(video.map(|v| v.id))
    }
}

fn episode_from_item(item: PlaylistItem) -> EpisodeDetails {
    let snippet = item.snippet;
    EpisodeDetails {
        thumbnail_url: snippet.thumbnails.best_url().map(str::to_string),
        video_id: snippet.resource_id.video_id,
        title: snippet.title,
        description: snippet.description,
        author: Author {
            name: snippet.channel_title,
            channel_id: snippet.channel_id,
        },
        published_at: snippet.published_at,
    }
}

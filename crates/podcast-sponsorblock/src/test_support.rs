//! In-memory collaborators for unit and router tests

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};

use crate::artwork::{ArtworkError, ArtworkLookup};
use crate::config::Config;
use crate::media::{FetchError, MediaFetcher};
use crate::models::{Author, ChannelDetails, EpisodeDetails, PlaylistIdentity};
use crate::provider::{MetadataProvider, ProviderError};
use crate::render::{ChannelMetadata, FeedEntry, FeedWriter, RenderError, RssFeedWriter};
use crate::state::{Collaborators, ServerState, SharedState};

pub const CHANNEL_ICON: &str = "https://yt3.ggpht.com/channel.jpg";

pub fn playlist(id: &str) -> PlaylistIdentity {
    PlaylistIdentity {
        id: id.to_string(),
        title: format!("Playlist {}", id),
        description: format!("Episodes from {}", id),
        author: Author {
            name: "Channel One".to_string(),
            channel_id: "UC1".to_string(),
        },
        icon_url: Some("https://i.ytimg.com/playlist.jpg".to_string()),
    }
}

/// An episode published `hours` hours after a fixed epoch
pub fn episode(video_id: &str, hours: i64) -> EpisodeDetails {
    EpisodeDetails {
        video_id: video_id.to_string(),
        title: format!("Episode {}", video_id),
        description: String::new(),
        author: Author {
            name: "Channel One".to_string(),
            channel_id: "UC1".to_string(),
        },
        thumbnail_url: None,
        published_at: DateTime::<Utc>::from_timestamp(1_700_000_000 + hours * 3600, 0)
            .unwrap(),
    }
}

#[derive(Default)]
pub struct FakeProvider {
    playlists: HashMap<String, (PlaylistIdentity, Vec<EpisodeDetails>)>,
    videos: HashSet<String>,
    fail_items: AtomicBool,
    playlist_calls: AtomicUsize,
    item_calls: AtomicUsize,
    channel_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn with_playlist(identity: PlaylistIdentity, episodes: Vec<EpisodeDetails>) -> Self {
        let mut provider = Self::default();
        provider
            .playlists
            .insert(identity.id.clone(), (identity, episodes));
        provider
    }

    pub fn with_videos(mut self, ids: &[&str]) -> Self {
        self.videos.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn fail_items(&self, fail: bool) {
        self.fail_items.store(fail, Ordering::SeqCst);
    }

    pub fn playlist_calls(&self) -> usize {
        self.playlist_calls.load(Ordering::SeqCst)
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    pub fn channel_calls(&self) -> usize {
        self.channel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn get_playlist(
        &self,
        playlist_id: &str,
    ) -> Result<Option<PlaylistIdentity>, ProviderError> {
        self.playlist_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.playlists.get(playlist_id).map(|(p, _)| p.clone()))
    }

    async fn get_channel(
        &self,
        channel_id: &str,
    ) -> Result<Option<ChannelDetails>, ProviderError> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(ChannelDetails {
            id: channel_id.to_string(),
            title: "Channel One".to_string(),
            icon_url: Some(CHANNEL_ICON.to_string()),
        }))
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<EpisodeDetails>, ProviderError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail_items.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("quota exceeded".to_string()));
        }
        Ok(self
            .playlists
            .get(playlist_id)
            .map(|(_, episodes)| episodes.clone())
            .unwrap_or_default())
    }

    async fn find_video(&self, video_id: &str) -> Result<Option<String>, ProviderError> {
        Ok(self.videos.get(video_id).cloned())
    }
}

/// Media fetcher that writes a small file and counts invocations
#[derive(Default)]
pub struct CountingFetcher {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
    last_categories: Mutex<Vec<String>>,
}

impl CountingFetcher {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_categories(&self) -> Vec<String> {
        self.last_categories.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaFetcher for CountingFetcher {
    async fn download(
        &self,
        _video_id: &str,
        output_path: &Path,
        categories_to_remove: &[String],
    ) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_categories.lock().unwrap() = categories_to_remove.to_vec();
        tokio::time::sleep(self.delay).await;

        // Leave a partial file behind, as a real downloader would
        tokio::fs::write(output_path, b"audio").await?;
        if self.fail {
            return Err(FetchError::Failed {
                code: Some(1),
                stderr: "ERROR: Video unavailable".to_string(),
            });
        }
        Ok(())
    }
}

/// Feed writer that renders real RSS and records what it was given
#[derive(Default)]
pub struct CountingWriter {
    calls: AtomicUsize,
    channels: Mutex<Vec<ChannelMetadata>>,
    first_enclosures: Mutex<Vec<String>>,
}

impl CountingWriter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_channel(&self) -> Option<ChannelMetadata> {
        self.channels.lock().unwrap().last().cloned()
    }

    /// Enclosure URL of the first entry of every rendered feed
    pub fn first_enclosures(&self) -> Vec<String> {
        self.first_enclosures.lock().unwrap().clone()
    }
}

impl FeedWriter for CountingWriter {
    fn render(
        &self,
        channel: &ChannelMetadata,
        entries: &[FeedEntry],
    ) -> Result<Bytes, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.channels.lock().unwrap().push(channel.clone());
        if let Some(entry) = entries.first() {
            self.first_enclosures
                .lock()
                .unwrap()
                .push(entry.enclosure_url.clone());
        }
        RssFeedWriter.render(channel, entries)
    }
}

#[derive(Default)]
pub struct FakeArtwork {
    fail: bool,
}

impl FakeArtwork {
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl ArtworkLookup for FakeArtwork {
    async fn artwork_url(&self, itunes_id: u64) -> Result<String, ArtworkError> {
        if self.fail {
            Err(ArtworkError::NotFound(itunes_id))
        } else {
            Ok(format!("https://is1.mzstatic.com/{}.jpg", itunes_id))
        }
    }
}

/// Configuration rooted at `data_path`, plus extra variables
pub fn test_config(data_path: &Path, extra: &[(&str, &str)]) -> Config {
    let mut vars = vec![
        ("PODCAST_YOUTUBE_API_KEY".to_string(), "test-key".to_string()),
        (
            "PODCAST_DATA_PATH".to_string(),
            data_path.to_string_lossy().into_owned(),
        ),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    Config::from_vars(vars).unwrap()
}

pub fn test_state(config: &Config) -> SharedState {
    test_state_with(
        config,
        Arc::new(FakeProvider::default()),
        Arc::new(CountingFetcher::default()),
    )
}

pub fn test_state_with(
    config: &Config,
    provider: Arc<FakeProvider>,
    fetcher: Arc<CountingFetcher>,
) -> SharedState {
    Arc::new(ServerState::new(
        config,
        Collaborators {
            provider,
            fetcher,
            writer: Arc::new(RssFeedWriter),
            artwork: Arc::new(FakeArtwork::default()),
        },
    ))
}

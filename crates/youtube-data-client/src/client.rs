//! YouTube Data API HTTP client

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Result, YoutubeError};
use crate::types::{Channel, ListResponse, Playlist, PlaylistItem, Video};

/// The API's maximum page size for `playlistItems.list`
const PAGE_SIZE: &str = "50";

/// Client for the YouTube Data API v3, authenticated with an API key
pub struct YoutubeClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl YoutubeClient {
    /// Base URL for the YouTube Data API v3
    pub const BASE_URL: &'static str = "https://www.googleapis.com/youtube/v3";

    /// Create a new client against the public API (30 second timeout)
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, Self::BASE_URL)
    }

    /// Create a new client against a custom API root
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, resource))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<ListResponse<T>> {
        let url = self.endpoint(resource, params)?;
        debug!(resource, "Requesting YouTube API");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Get a playlist by ID, or `None` if it does not exist
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Option<Playlist>> {
        let response: ListResponse<Playlist> = self
            .list("playlists", &[("part", "snippet"), ("id", playlist_id)])
            .await?;
        Ok(response.items.into_iter().next())
    }

    /// Get a channel by ID, or `None` if it does not exist
    pub async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>> {
        let response: ListResponse<Channel> = self
            .list("channels", &[("part", "snippet"), ("id", channel_id)])
            .await?;
        Ok(response.items.into_iter().next())
    }

    /// Get every item of a playlist, following `nextPageToken` until exhausted
    ///
    /// Items are returned in API order and include unavailable ones; see
    /// [`PlaylistItem::is_available`].
    pub async fn list_playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ListResponse<PlaylistItem> = {
                let mut params = vec![
                    ("part", "snippet,status"),
                    ("playlistId", playlist_id),
                    ("maxResults", PAGE_SIZE),
                ];
                if let Some(ref token) = page_token {
                    params.push(("pageToken", token.as_str()));
                }
                self.list("playlistItems", &params).await?
            };
            items.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(playlist_id, count = items.len(), "Fetched playlist items");
        Ok(items)
    }

    /// Get a video by ID, or `None` if it does not exist
    pub async fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let response: ListResponse<Video> = self
            .list("videos", &[("part", "id"), ("id", video_id)])
            .await?;
        Ok(response.items.into_iter().next())
    }
}

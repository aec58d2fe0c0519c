//! iTunes artwork lookup for podcasts that are also listed on Apple Podcasts

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";

#[derive(Debug)]
pub enum ArtworkError {
    Http(reqwest::Error),
    NotFound(u64),
}

impl fmt::Display for ArtworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "iTunes HTTP error: {}", e),
            Self::NotFound(id) => write!(f, "No iTunes artwork for {}", id),
        }
    }
}

impl std::error::Error for ArtworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::NotFound(_) => None,
        }
    }
}

impl From<reqwest::Error> for ArtworkError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// Resolves the artwork URL of an iTunes podcast listing
#[async_trait]
pub trait ArtworkLookup: Send + Sync {
    async fn artwork_url(&self, itunes_id: u64) -> Result<String, ArtworkError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResult {
    artwork_url600: Option<String>,
    artwork_url100: Option<String>,
}

/// Client for the iTunes lookup API
pub struct ItunesArtwork {
    client: Client,
    base_url: String,
}

impl ItunesArtwork {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.to_string(),
        }
    }
}

impl Default for ItunesArtwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtworkLookup for ItunesArtwork {
    async fn artwork_url(&self, itunes_id: u64) -> Result<String, ArtworkError> {
        let url = format!("{}/lookup?id={}", self.base_url, itunes_id);
        debug!(itunes_id, "Looking up iTunes artwork");

        let response: LookupResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        best_artwork(response).ok_or(ArtworkError::NotFound(itunes_id))
    }
}

fn best_artwork(response: LookupResponse) -> Option<String> {
    response
        .results
        .into_iter()
        .find_map(|r| r.artwork_url600.or(r.artwork_url100))
}

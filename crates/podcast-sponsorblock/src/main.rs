//! Podcast SponsorBlock - YouTube playlists as podcast feeds
//!
//! Serves each playlist as an RSS feed whose enclosures point back at this
//! service, which downloads the audio on first request with sponsor
//! segments cut out.

mod artwork;
mod assembler;
mod auth;
mod config;
mod error;
mod feed_cache;
mod keys;
mod links;
mod media;
mod models;
mod provider;
mod render;
mod routes;
mod server;
mod state;
#[cfg(test)]
mod test_support;
mod thumbnails;
mod validation;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use youtube_data_client::YoutubeClient;

use crate::artwork::ItunesArtwork;
use crate::config::Config;
use crate::error::Result;
use crate::media::YtDlpFetcher;
use crate::render::RssFeedWriter;
use crate::server::start_server;
use crate::state::{Collaborators, ServerState, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("podcast_sponsorblock=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Podcast SponsorBlock...");

    let config = Config::from_env()?;
    config.log();

    let collaborators = Collaborators {
        provider: Arc::new(YoutubeClient::new(&config.youtube_api_key)),
        fetcher: Arc::new(YtDlpFetcher::new(&config.ytdlp_path)),
        writer: Arc::new(RssFeedWriter),
        artwork: Arc::new(ItunesArtwork::new()),
    };
    let state: SharedState = Arc::new(ServerState::new(&config, collaborators));

    // Start HTTP server (blocking)
    start_server(state, config.port).await?;

    Ok(())
}

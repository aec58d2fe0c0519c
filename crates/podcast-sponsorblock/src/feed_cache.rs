//! Rendered feed documents, cached per playlist and requesting host

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use flight_cache::FlightCache;
use tracing::{info, warn};

use crate::artwork::ArtworkLookup;
use crate::assembler::{FeedAssembler, FeedError};
use crate::keys::FeedDocumentKey;
use crate::links::Links;
use crate::models::{FeedOptions, PodcastOverrides};
use crate::render::{build_feed, FeedRenderContext, FeedWriter};

pub struct FeedResponseCache {
    assembler: Arc<FeedAssembler>,
    writer: Arc<dyn FeedWriter>,
    artwork: Arc<dyn ArtworkLookup>,
    links: Arc<Links>,
    overrides: Arc<HashMap<String, PodcastOverrides>>,
    documents: FlightCache<FeedDocumentKey, Bytes>,
    ttl: Duration,
}

impl FeedResponseCache {
    pub fn new(
        assembler: Arc<FeedAssembler>,
        writer: Arc<dyn FeedWriter>,
        artwork: Arc<dyn ArtworkLookup>,
        links: Arc<Links>,
        overrides: HashMap<String, PodcastOverrides>,
        ttl: Duration,
        cache_capacity: u64,
    ) -> Self {
        Self {
            assembler,
            writer,
            artwork,
            links,
            overrides: Arc::new(overrides),
            documents: FlightCache::new("feeds", cache_capacity),
            ttl,
        }
    }

    /// The feed document for `playlist_id` as seen from `host`
    ///
    /// The playlist's existence is confirmed upstream on every call, so a
    /// missing playlist is reported even while an old document is cached.
    pub async fn get_or_render(&self, playlist_id: &str, host: &str) -> Result<Bytes, FeedError> {
        let playlist = self.assembler.identify(playlist_id).await?;
        let host = self.links.effective_host(host).to_string();
        let key = FeedDocumentKey::new(&playlist.id, &host);

        let assembler = self.assembler.clone();
        let writer = self.writer.clone();
        let artwork = self.artwork.clone();
        let links = self.links.clone();
        let overrides = self.overrides.get(&playlist.id).cloned();

        let document = self
            .documents
            .get_or_compute(key, self.ttl, async move {
                let feed = assembler.assemble(playlist).await?;

                let artwork_url = match overrides.as_ref().and_then(|o| o.itunes_id) {
                    Some(itunes_id) => match artwork.artwork_url(itunes_id).await {
                        Ok(url) => Some(url),
                        Err(e) => {
                            warn!(playlist_id = %feed.playlist.id, itunes_id, error = %e, "Artwork lookup failed, omitting");
                            None
                        }
                    },
                    None => None,
                };

                let options = FeedOptions { host, overrides };
                let ctx = FeedRenderContext {
                    playlist: &feed.playlist,
                    episodes: &feed.episodes,
                    logo_url: &feed.logo_url,
                    options: &options,
                    artwork_url,
                };
                let (channel, entries) = build_feed(&ctx, &links);
                let bytes = writer.render(&channel, &entries)?;

                info!(
                    playlist_id = %feed.playlist.id,
                    host = %options.host,
                    episodes = entries.len(),
                    "Rendered feed"
                );
                Ok::<_, FeedError>(bytes)
            })
            .await?;
        Ok(document)
    }

    /// Live entry counts: (documents, episode lists, logos)
    pub fn cache_sizes(&self) -> (u64, u64, u64) {
        let (episode_lists, logos) = self.assembler.cache_sizes();
        (self.documents.entry_count(), episode_lists, logos)
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::artwork::ArtworkLookup;
use crate::assembler::FeedAssembler;
use crate::auth::AuthSettings;
use crate::config::Config;
use crate::feed_cache::FeedResponseCache;
use crate::links::Links;
use crate::media::{AudioLibrary, MediaFetcher};
use crate::provider::MetadataProvider;
use crate::render::FeedWriter;
use crate::thumbnails::ThumbnailStore;

/// External services the server talks to
pub struct Collaborators {
    pub provider: Arc<dyn MetadataProvider>,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub writer: Arc<dyn FeedWriter>,
    pub artwork: Arc<dyn ArtworkLookup>,
}

/// Shared state for the HTTP server
///
/// Owns every cache and the download guards; created once at startup and
/// dropped with the server.
pub struct ServerState {
    pub provider: Arc<dyn MetadataProvider>,
    pub feeds: FeedResponseCache,
    pub audio: AudioLibrary,
    pub thumbnails: Arc<ThumbnailStore>,
    pub links: Arc<Links>,
    /// Lower-cased alias name → playlist ID
    pub aliases: HashMap<String, String>,
    pub auth: AuthSettings,
    pub started_at: DateTime<Utc>,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let link_key = if config.append_auth_param_to_resource_links {
            config.auth_key.clone()
        } else {
            None
        };
        let links = Arc::new(Links::new(config.trusted_hosts.clone(), link_key));
        let thumbnails = Arc::new(ThumbnailStore::new(
            config.thumbnail_dir(),
            config.aliases.clone(),
        ));

        let assembler = Arc::new(FeedAssembler::new(
            collaborators.provider.clone(),
            thumbnails.clone(),
            links.clone(),
            config.feed_ttl,
            config.cache_capacity,
        ));
        let feeds = FeedResponseCache::new(
            assembler,
            collaborators.writer,
            collaborators.artwork,
            links.clone(),
            config.overrides.clone(),
            config.feed_ttl,
            config.cache_capacity,
        );
        let audio = AudioLibrary::new(
            config.audio_dir(),
            collaborators.fetcher,
            config.categories_to_remove.clone(),
        );

        Self {
            provider: collaborators.provider,
            feeds,
            audio,
            thumbnails,
            links,
            aliases: config.aliases.clone(),
            auth: AuthSettings::new(config.auth_key.clone(), config.allow_query_param_auth),
            started_at: Utc::now(),
        }
    }

    /// Playlist ID for a path segment that may name an alias
    pub fn resolve_alias(&self, name: &str) -> String {
        self.aliases
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

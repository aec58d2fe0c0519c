use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::error::{Result, ServiceError};
use crate::models::PodcastOverrides;

const ALIAS_PREFIX: &str = "PODCAST_ALIAS_";

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub youtube_api_key: String,
    pub auth_key: Option<String>,
    pub data_path: PathBuf,
    pub allow_query_param_auth: bool,
    pub append_auth_param_to_resource_links: bool,
    /// Lower-cased alias name → playlist ID
    pub aliases: HashMap<String, String>,
    pub categories_to_remove: Vec<String>,
    /// Origins such as `https://pod.example.com`
    pub trusted_hosts: Vec<String>,
    /// Playlist ID → podcast metadata overrides
    pub overrides: HashMap<String, PodcastOverrides>,
    pub feed_ttl: Duration,
    pub cache_capacity: u64,
    pub ytdlp_path: String,
}

impl Config {
    /// Parse configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Parse configuration from an arbitrary set of variables
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let port = vars
            .get("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let youtube_api_key = required(&vars, "PODCAST_YOUTUBE_API_KEY")?;
        let data_path = PathBuf::from(required(&vars, "PODCAST_DATA_PATH")?);
        let auth_key = vars.get("PODCAST_AUTH_KEY").cloned();

        let allow_query_param_auth = is_true(vars.get("PODCAST_ALLOW_QUERY_PARAM_AUTH"));
        let append_auth_param_to_resource_links =
            is_true(vars.get("PODCAST_APPEND_AUTH_PARAM_TO_RESOURCE_LINKS"));
        if append_auth_param_to_resource_links && !allow_query_param_auth {
            return Err(ServiceError::Config(
                "Cannot append auth param to resource links when query auth is not allowed"
                    .to_string(),
            ));
        }
        if append_auth_param_to_resource_links && auth_key.is_none() {
            return Err(ServiceError::Config(
                "Cannot append auth param to resource links without PODCAST_AUTH_KEY".to_string(),
            ));
        }

        let aliases = vars
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ALIAS_PREFIX)
                    .map(|name| (name.to_lowercase(), value.clone()))
            })
            .collect();

        let categories_to_remove = vars
            .get("PODCAST_CATEGORIES_TO_REMOVE")
            .map(|s| split_list(s))
            .unwrap_or_else(|| vec!["sponsor".to_string()]);

        let trusted_hosts = vars
            .get("PODCAST_TRUSTED_HOSTS")
            .map(|s| split_list(s))
            .unwrap_or_default();

        let overrides = match vars.get("PODCAST_OVERRIDES_PATH") {
            Some(path) => load_overrides(Path::new(path))?,
            None => HashMap::new(),
        };

        let feed_ttl = vars
            .get("PODCAST_FEED_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60 * 60));

        let cache_capacity = vars
            .get("PODCAST_CACHE_CAPACITY")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1024);

        let ytdlp_path = vars
            .get("PODCAST_YTDLP_PATH")
            .cloned()
            .unwrap_or_else(|| "yt-dlp".to_string());

        Ok(Self {
            port,
            youtube_api_key,
            auth_key,
            data_path,
            allow_query_param_auth,
            append_auth_param_to_resource_links,
            aliases,
            categories_to_remove,
            trusted_hosts,
            overrides,
            feed_ttl,
            cache_capacity,
            ytdlp_path,
        })
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.data_path.join("audio")
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.data_path.join("thumbnails")
    }

    /// Log the loaded configuration without revealing secrets
    pub fn log(&self) {
        let configured = |set: bool| if set { "(configured)" } else { "" };
        info!("Loaded configuration:");
        info!("  - Port: {}", self.port);
        info!("  - Data path: {:?}", self.data_path);
        info!("  - Trusted hosts: {:?}", self.trusted_hosts);
        info!("  - Aliases: {:?}", self.aliases);
        info!("  - Categories to remove: {:?}", self.categories_to_remove);
        info!("  - Podcast overrides: {} playlists", self.overrides.len());
        info!("  - YouTube key: {}", configured(!self.youtube_api_key.is_empty()));
        info!("  - Auth key: {}", configured(self.auth_key.is_some()));
        info!("  - Allow query parameter auth: {}", self.allow_query_param_auth);
        info!(
            "  - Append auth parameter to resource links: {}",
            self.append_auth_param_to_resource_links
        );
        info!("  - Feed TTL: {} seconds", self.feed_ttl.as_secs());
        info!("  - Cache capacity: {} entries", self.cache_capacity);
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ServiceError::Config(format!("Missing configuration value: {}", name)))
}

fn is_true(value: Option<&String>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn load_overrides(path: &Path) -> Result<HashMap<String, PodcastOverrides>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ServiceError::Config(format!("Failed to read overrides file {:?}: {}", path, e))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        ServiceError::Config(format!("Invalid overrides file {:?}: {}", path, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn minimal() -> Vec<(String, String)> {
        vars(&[
            ("PODCAST_YOUTUBE_API_KEY", "yt-key"),
            ("PODCAST_DATA_PATH", "/srv/podcasts"),
        ])
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(minimal()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.youtube_api_key, "yt-key");
        assert_eq!(config.audio_dir(), PathBuf::from("/srv/podcasts/audio"));
        assert_eq!(config.thumbnail_dir(), PathBuf::from("/srv/podcasts/thumbnails"));
        assert!(config.auth_key.is_none());
        assert!(!config.allow_query_param_auth);
        assert_eq!(config.categories_to_remove, vec!["sponsor"]);
        assert!(config.trusted_hosts.is_empty());
        assert_eq!(config.feed_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.ytdlp_path, "yt-dlp");
    }

    #[test]
    fn test_missing_required_value() {
        let err = Config::from_vars(vars(&[("PODCAST_DATA_PATH", "/srv")])).unwrap_err();
        assert!(err.to_string().contains("PODCAST_YOUTUBE_API_KEY"));
    }

    #[test]
    fn test_lists_and_aliases() {
        let mut input = minimal();
        input.extend(vars(&[
            ("PODCAST_CATEGORIES_TO_REMOVE", "sponsor, selfpromo,intro"),
            (
                "PODCAST_TRUSTED_HOSTS",
                "https://pod.example.com,http://localhost:8080",
            ),
            ("PODCAST_ALIAS_MyShow", "PL123"),
            ("PODCAST_ALLOW_QUERY_PARAM_AUTH", "TRUE"),
        ]));

        let config = Config::from_vars(input).unwrap();
        assert_eq!(
            config.categories_to_remove,
            vec!["sponsor", "selfpromo", "intro"]
        );
        assert_eq!(
            config.trusted_hosts,
            vec!["https://pod.example.com", "http://localhost:8080"]
        );
        assert_eq!(config.aliases.get("myshow").map(String::as_str), Some("PL123"));
        assert!(config.allow_query_param_auth);
    }

    #[test]
    fn test_append_requires_query_auth() {
        let mut input = minimal();
        input.extend(vars(&[
            ("PODCAST_AUTH_KEY", "secret"),
            ("PODCAST_APPEND_AUTH_PARAM_TO_RESOURCE_LINKS", "true"),
        ]));
        assert!(Config::from_vars(input).is_err());
    }

    #[test]
    fn test_append_requires_auth_key() {
        let mut input = minimal();
        input.extend(vars(&[
            ("PODCAST_ALLOW_QUERY_PARAM_AUTH", "true"),
            ("PODCAST_APPEND_AUTH_PARAM_TO_RESOURCE_LINKS", "true"),
        ]));
        assert!(Config::from_vars(input).is_err());
    }

    #[test]
    fn test_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(
            &path,
            r#"{"PL123": {"itunes_id": 42, "language": "en", "explicit": true}}"#,
        )
        .unwrap();

        let mut input = minimal();
        input.push((
            "PODCAST_OVERRIDES_PATH".to_string(),
            path.to_string_lossy().to_string(),
        ));

        let config = Config::from_vars(input).unwrap();
        let overrides = &config.overrides["PL123"];
        assert_eq!(overrides.itunes_id, Some(42));
        assert_eq!(overrides.explicit, Some(true));
    }

    #[test]
    fn test_unreadable_overrides_file() {
        let mut input = minimal();
        input.extend(vars(&[("PODCAST_OVERRIDES_PATH", "/nonexistent/overrides.json")]));
        assert!(Config::from_vars(input).is_err());
    }
}

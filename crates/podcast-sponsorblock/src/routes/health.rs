use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub feeds: u64,
    pub episode_lists: u64,
    pub logos: u64,
    pub download_guards: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let (feeds, episode_lists, logos) = state.feeds.cache_sizes();
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: CacheStats {
            feeds,
            episode_lists,
            logos,
            download_guards: state.audio.active_downloads(),
        },
    })
}

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::assembler::FeedError;
use crate::error::AppError;
use crate::state::SharedState;
use crate::validation::is_plausible_youtube_id;

const RSS_CONTENT_TYPE: &str = "application/rss+xml";

/// Podcast feed for a playlist ID or alias
pub async fn get_feed(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let playlist_id = state.resolve_alias(&name);
    if !is_plausible_youtube_id(&playlist_id) {
        return Err(AppError::BadRequest("Invalid playlist id".to_string()));
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    if state.links.restricts_hosts() && !state.links.is_trusted_host(host) {
        warn!(host = %host, "Rejected feed request for untrusted host");
        return Err(AppError::BadRequest("Untrusted host".to_string()));
    }

    match state.feeds.get_or_render(&playlist_id, host).await {
        Ok(document) => Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], document).into_response()),
        Err(FeedError::PlaylistNotFound(id)) => {
            warn!(playlist_id = %id, "Requested playlist does not exist");
            Err(AppError::BadRequest("Playlist not found".to_string()))
        }
        Err(e) => Err(AppError::Internal(format!(
            "Failed to generate feed for {}: {}",
            playlist_id, e
        ))),
    }
}

use axum::extract::{Path, Request, State};
use axum::response::Response;
use tracing::error;

use crate::error::AppError;
use crate::keys::DownloadKey;
use crate::links::AUDIO_EXTENSION;
use crate::routes::serve_file;
use crate::state::SharedState;
use crate::validation::is_plausible_youtube_id;

/// Audio of a video with sponsor segments removed, downloaded on first request
pub async fn get_audio(
    State(state): State<SharedState>,
    Path(segment): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let requested = segment.strip_suffix(AUDIO_EXTENSION).unwrap_or(&segment);
    if !is_plausible_youtube_id(requested) {
        return Err(AppError::BadRequest("Invalid video id".to_string()));
    }

    let video_id = match state.provider.find_video(requested).await {
        Ok(Some(id)) => id,
        Ok(None) => return Err(AppError::BadRequest("Video not found".to_string())),
        Err(e) => {
            return Err(AppError::Internal(format!(
                "Failed to look up video {}: {}",
                requested, e
            )))
        }
    };

    let path = state
        .audio
        .fetch_or_download(&DownloadKey::new(&video_id))
        .await
        .map_err(|e| {
            error!(video_id = %video_id, error = %e, "Audio download failed");
            AppError::Internal("Failed to download audio".to_string())
        })?;

    Ok(serve_file(&path, request).await)
}

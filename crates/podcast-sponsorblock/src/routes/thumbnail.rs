use axum::extract::{Path, Request, State};
use axum::response::Response;

use crate::error::AppError;
use crate::routes::serve_file;
use crate::state::SharedState;

/// A stored podcast image, by file stem or alias
pub async fn get_thumbnail(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    match state.thumbnails.find(&key).await {
        Some(path) => Ok(serve_file(&path, request).await),
        None => Err(AppError::NotFound("Thumbnail not found".to_string())),
    }
}

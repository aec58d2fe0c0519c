pub mod feed;
pub mod health;
pub mod media;
pub mod thumbnail;

use std::path::Path;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Stream a file from disk, honoring range and conditional request headers
pub async fn serve_file(path: &Path, request: Request) -> Response {
    ServeFile::new(path).oneshot(request).await.into_response()
}

//! HTTP server for the podcast endpoints
//!
//! Provides /health plus the authenticated feed, media and thumbnail routes.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::{log_request, require_auth};
use crate::links::{MEDIA_ROUTE, RSS_ROUTE, THUMBNAIL_ROUTE};
use crate::routes;
use crate::state::SharedState;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let protected = Router::new()
        .route(
            &format!("{}/{{playlist_id}}", RSS_ROUTE),
            get(routes::feed::get_feed),
        )
        .route(
            &format!("{}/{{video_id}}", MEDIA_ROUTE),
            get(routes::media::get_audio),
        )
        .route(
            &format!("{}/{{key}}", THUMBNAIL_ROUTE),
            get(routes::thumbnail::get_thumbnail),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(protected)
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

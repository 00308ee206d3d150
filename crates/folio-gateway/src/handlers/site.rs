//! Portfolio page, background video and the 404 page.

use crate::error::GatewayError;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::path::PathBuf;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// `GET /`.
pub async fn index(State(state): State<AppState>, request: Request<Body>) -> Response {
    serve_file(state.config.site_dir.join("index.html"), request).await
}

/// `GET /video`.
pub async fn video(State(state): State<AppState>, request: Request<Body>) -> Response {
    match &state.config.video_file {
        Some(path) => serve_file(path.clone(), request).await,
        None => GatewayError::NotFound("video".to_string()).into_response(),
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> GatewayError {
    GatewayError::NotFound("route".to_string())
}

async fn serve_file(path: PathBuf, request: Request<Body>) -> Response {
    let exists = tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !exists {
        return GatewayError::NotFound(path.display().to_string()).into_response();
    }

    let result: Result<_, Infallible> = ServeFile::new(path).oneshot(request).await;
    match result {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

//! Static feed document
//!
//! Only the configured feed file is served; any other name is a 404.

use crate::{ApiError, AppState};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

pub async fn serve_feed(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if file != state.config.data.feed_file {
        return Err(ApiError::NotFound { resource: format!("/data/{}", file) });
    }

    let path = state.config.feed_path();
    let body = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ApiError::NotFound {
            resource: path.to_string_lossy().to_string(),
        },
        _ => ApiError::InternalError { message: e.to_string() },
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

//! Request handlers.

use super::AppState;
use crate::core::converter::to_webvtt;
use crate::core::stream::{open_stream, StreamStatus};
use crate::utils::names::get_extension;
use crate::Error;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Cache directive for converted subtitles.
pub const SUBTITLE_CACHE_CONTROL: &str = "public, max-age=86400";

/// Error wrapper rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    pub folder_id: Option<String>,
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/scan
pub async fn scan_library(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let library = state.scanner.scan_library().await?;
    Ok(Json(library))
}

/// GET /api/movie/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.scanner.build_movie(&id).await?))
}

/// GET /api/tv/{id}
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.scanner.scan_show(&id).await?))
}

/// GET /api/video/{id}?folderId=
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<VideoQuery>,
) -> ApiResult<impl IntoResponse> {
    let info = state
        .scanner
        .video_info(&id, query.folder_id.as_deref())
        .await?;
    Ok(Json(info))
}

/// GET /api/stream/{id}
pub async fn stream_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let stream = open_stream(state.content.as_ref(), &id, range).await?;

    let status = match stream.status {
        StreamStatus::Full => StatusCode::OK,
        StreamStatus::Partial => StatusCode::PARTIAL_CONTENT,
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, stream.content_type)
        .header(header::CONTENT_LENGTH, stream.content_length)
        .header(header::ACCEPT_RANGES, stream.accept_ranges)
        .header(header::CACHE_CONTROL, stream.cache_control);
    if let Some(content_range) = stream.content_range {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }

    builder
        .body(Body::from_stream(stream.body))
        .map_err(|e| ApiError(Error::Stream(e.to_string())))
}

/// GET /api/subtitle/{id}
pub async fn get_subtitle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let file = state
        .content
        .file_metadata(&id)
        .await?
        .ok_or_else(|| Error::not_found(format!("subtitle {}", id)))?;

    let content = state.content.fetch_text(&id).await?;
    let extension = get_extension(&file.name);
    let vtt = to_webvtt(&content, extension.as_deref());

    Ok((
        [
            (header::CONTENT_TYPE, "text/vtt; charset=utf-8"),
            (header::CACHE_CONTROL, SUBTITLE_CACHE_CONTROL),
        ],
        vtt,
    ))
}

//! Integration tests for range streaming and the HTTP routes.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use common::{FakeDrive, ROOT};
use drive_media::core::scanner::{LibraryScanner, ScanOptions};
use drive_media::core::stream::{open_stream, StreamStatus};
use drive_media::models::drive::ByteSpan;
use drive_media::server::{create_router, AppState};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tower::util::ServiceExt;

fn sample_bytes() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 251) as u8).collect()
}

fn media_drive() -> FakeDrive {
    let mut drive = FakeDrive::new();
    drive
        .folder(ROOT, "movies", "Movies")
        .content("movies", "video", "Clip (2020).mp4", "video/mp4", &sample_bytes())
        .content("movies", "empty", "Empty (2020).mp4", "", &[])
        .content(
            "movies",
            "sub",
            "Clip (2020).en.srt",
            "application/x-subrip",
            b"1\n00:00:01,000 --> 00:00:02,000\nHello\n",
        )
        .content("movies", "flaky", "Flaky (2020).mp4", "video/mp4", &sample_bytes())
        .break_stream("flaky");
    drive
}

fn app(drive: Arc<FakeDrive>) -> axum::Router {
    let scanner = LibraryScanner::new(drive.clone(), drive.clone(), ScanOptions::default());
    create_router(Arc::new(AppState::new(scanner, drive)))
}

#[tokio::test]
async fn test_partial_range() {
    let drive = media_drive();
    let response = open_stream(&drive, "video", Some("bytes=100-199")).await.unwrap();

    assert_eq!(response.status, StreamStatus::Partial);
    assert_eq!(response.content_length, 100);
    assert_eq!(response.content_range.as_deref(), Some("bytes 100-199/1000"));
    assert_eq!(response.content_type, "video/mp4");
    assert_eq!(response.accept_ranges, "bytes");
    assert_eq!(response.cache_control, "public, max-age=3600");

    let chunks: Vec<_> = response.body.try_collect().await.unwrap();
    let body: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
    assert_eq!(body, sample_bytes()[100..200].to_vec());
    assert_eq!(
        drive.fetched_spans.lock().unwrap().as_slice(),
        &[Some(ByteSpan { start: 100, end: 199 })]
    );
}

#[tokio::test]
async fn test_full_content_without_range() {
    let drive = media_drive();
    let response = open_stream(&drive, "video", None).await.unwrap();

    assert_eq!(response.status, StreamStatus::Full);
    assert_eq!(response.content_length, 1000);
    assert!(response.content_range.is_none());

    let chunks: Vec<_> = response.body.try_collect().await.unwrap();
    let total: usize = chunks.iter().map(|c| c.len()).sum();
    assert_eq!(total, 1000);
}

#[tokio::test]
async fn test_malformed_range_is_full() {
    let drive = media_drive();
    let response = open_stream(&drive, "video", Some("bytes=abc")).await.unwrap();

    assert_eq!(response.status, StreamStatus::Full);
    assert_eq!(response.content_length, 1000);
}

#[tokio::test]
async fn test_empty_file() {
    let drive = media_drive();
    let response = open_stream(&drive, "empty", Some("bytes=0-")).await.unwrap();

    assert_eq!(response.status, StreamStatus::Full);
    assert_eq!(response.content_length, 0);
    assert_eq!(response.content_type, "video/mp4");
    assert_eq!(drive.fetched_spans.lock().unwrap().as_slice(), &[None]);
}

#[tokio::test]
async fn test_upstream_failure_mid_stream() {
    let drive = media_drive();
    let response = open_stream(&drive, "flaky", Some("bytes=0-9")).await.unwrap();

    assert_eq!(response.status, StreamStatus::Partial);
    let chunks: Vec<_> = response.body.collect().await;
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].as_ref().unwrap().len(), 5);
    assert!(chunks[1].is_err());
    assert_eq!(drive.fetched_spans.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_file() {
    let drive = media_drive();
    let err = open_stream(&drive, "nope", None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stream_route_partial() {
    let app = app(Arc::new(media_drive()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stream/video")
                .header(header::RANGE, "bytes=900-")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 900-999/1000");
    assert_eq!(headers[header::CONTENT_LENGTH], "100");
    assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.to_vec(), sample_bytes()[900..].to_vec());
}

#[tokio::test]
async fn test_stream_route_body_fails_after_headers() {
    let drive = Arc::new(media_drive());
    let app = app(drive.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stream/flaky")
                .header(header::RANGE, "bytes=0-9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
    assert!(to_bytes(response.into_body(), usize::MAX).await.is_err());
    assert_eq!(drive.fetched_spans.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stream_route_full() {
    let app = app(Arc::new(media_drive()));

    let response = app
        .oneshot(Request::builder().uri("/api/stream/video").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CONTENT_RANGE).is_none());
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "1000");
}

#[tokio::test]
async fn test_subtitle_route_converts() {
    let app = app(Arc::new(media_drive()));

    let response = app
        .oneshot(Request::builder().uri("/api/subtitle/sub").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/vtt; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=86400"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n"
    );
}

#[tokio::test]
async fn test_not_found_is_json_404() {
    let app = app(Arc::new(media_drive()));

    let response = app
        .oneshot(Request::builder().uri("/api/movie/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_video_route() {
    let app = app(Arc::new(media_drive()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/video/video?folderId=movies")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["title"], "Clip");
    assert_eq!(json["streamUrl"], "/api/stream/video");
    assert_eq!(json["subtitles"][0]["language"], "en");
}

#[tokio::test]
async fn test_health_route() {
    let app = app(Arc::new(media_drive()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

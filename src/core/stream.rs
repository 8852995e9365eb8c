//! Range-aware stream proxy.
//!
//! Translates an inbound `Range` header into a ranged fetch against the
//! content source and relays the bytes chunk by chunk. Dropping the returned
//! body drops the upstream request.

use crate::models::drive::ByteSpan;
use crate::services::{ByteStream, ContentSource};
use crate::{Error, Result};
use futures::{StreamExt, TryStreamExt};
use regex::Regex;
use std::sync::LazyLock;

/// Cache directive sent with every stream response.
pub const STREAM_CACHE_CONTROL: &str = "public, max-age=3600";

/// Content type used when the drive does not report one.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bytes=(\d+)-(\d*)").expect("valid range regex"));

/// A parsed `Range: bytes=<start>-<end>?` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
    pub end: Option<u64>,
}

/// Response status for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// 200, the whole file.
    Full,
    /// 206, a byte range.
    Partial,
}

/// Resolved byte window for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPlan {
    pub status: StreamStatus,
    /// Span to request upstream; `None` for an empty file.
    pub span: Option<ByteSpan>,
    pub content_length: u64,
    pub file_size: u64,
}

impl StreamPlan {
    /// `Content-Range` value for partial responses.
    pub fn content_range(&self) -> Option<String> {
        match (self.status, self.span) {
            (StreamStatus::Partial, Some(span)) => Some(format!(
                "bytes {}-{}/{}",
                span.start, span.end, self.file_size
            )),
            _ => None,
        }
    }
}

/// A ready-to-send stream with its framing metadata.
pub struct StreamResponse {
    pub status: StreamStatus,
    pub content_type: String,
    pub content_length: u64,
    pub content_range: Option<String>,
    pub accept_ranges: &'static str,
    pub cache_control: &'static str,
    pub body: ByteStream,
}

impl std::fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .finish_non_exhaustive()
    }
}

/// Parse a `Range` header value. Unsupported forms yield `None`.
pub fn parse_range_header(header: &str) -> Option<RangeRequest> {
    let caps = RANGE_RE.captures(header)?;
    let start = caps.get(1)?.as_str().parse().ok()?;
    let end = caps
        .get(2)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok());

    Some(RangeRequest { start, end })
}

/// Resolve a requested range against the file size.
///
/// An end past the file is clamped to the last byte; a start past the end
/// (or past the file) falls back to the whole file.
pub fn plan_range(file_size: u64, requested: Option<RangeRequest>) -> StreamPlan {
    if file_size == 0 {
        return StreamPlan {
            status: StreamStatus::Full,
            span: None,
            content_length: 0,
            file_size,
        };
    }

    let last = file_size - 1;
    let full = StreamPlan {
        status: StreamStatus::Full,
        span: Some(ByteSpan { start: 0, end: last }),
        content_length: file_size,
        file_size,
    };

    let Some(range) = requested else {
        return full;
    };

    let end = range.end.unwrap_or(last).min(last);
    if range.start > end {
        tracing::debug!(
            "Unsatisfiable range {}-{:?} for {} bytes, sending full content",
            range.start,
            range.end,
            file_size
        );
        return full;
    }

    let span = ByteSpan {
        start: range.start,
        end,
    };
    StreamPlan {
        status: StreamStatus::Partial,
        span: Some(span),
        content_length: span.len(),
        file_size,
    }
}

/// Open a (possibly ranged) stream for `file_id`.
pub async fn open_stream(
    source: &dyn ContentSource,
    file_id: &str,
    range_header: Option<&str>,
) -> Result<StreamResponse> {
    let metadata = source
        .file_metadata(file_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("file {}", file_id)))?;

    let file_size = metadata.size.unwrap_or(0);
    let requested = range_header.and_then(parse_range_header);
    let plan = plan_range(file_size, requested);

    tracing::debug!(
        "Streaming {} ({} bytes): {:?} {:?}",
        file_id,
        file_size,
        plan.status,
        plan.span
    );

    let upstream = source.fetch(file_id, plan.span).await?;
    let id = file_id.to_string();
    let body = upstream
        .inspect_err(move |e| tracing::error!("Stream for {} aborted: {}", id, e))
        .boxed();

    let content_type = if metadata.mime_type.is_empty() {
        DEFAULT_CONTENT_TYPE.to_string()
    } else {
        metadata.mime_type
    };

    Ok(StreamResponse {
        status: plan.status,
        content_type,
        content_length: plan.content_length,
        content_range: plan.content_range(),
        accept_ranges: "bytes",
        cache_control: STREAM_CACHE_CONTROL,
        body,
    })
}

//! Subtitle format conversion (SRT to WebVTT).
//!
//! Browsers only play WebVTT natively. SRT differs in three ways: no
//! `WEBVTT` header, `,` as the millisecond separator, and numbered cues.

use regex::Regex;
use std::sync::LazyLock;

/// Header every converted document starts with.
pub const VTT_HEADER: &str = "WEBVTT\n\n";

static SRT_TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2}),(\d{3})").expect("valid timestamp regex")
});

/// Convert SRT text to WebVTT.
///
/// Lines consisting only of digits are treated as cue numbers and dropped,
/// which also drops dialogue lines that are a bare number.
pub fn srt_to_vtt(srt_content: &str) -> String {
    let normalized = srt_content.replace("\r\n", "\n").replace('\r', "\n");
    let converted = SRT_TIMESTAMP_RE.replace_all(&normalized, "$1.$2");

    let body = converted
        .split('\n')
        .filter(|line| !is_cue_index(line.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}", VTT_HEADER, body)
}

/// Produce WebVTT for a subtitle file with the given extension.
///
/// `.vtt` passes through untouched; every other format goes through the
/// SRT converter, which leaves text without SRT timestamps mostly as-is.
pub fn to_webvtt(content: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) if ext.eq_ignore_ascii_case("vtt") => content.to_string(),
        _ => srt_to_vtt(content),
    }
}

fn is_cue_index(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

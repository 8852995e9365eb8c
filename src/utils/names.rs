//! Filename utilities.

/// Supported video file extensions.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp",
];

/// Supported subtitle file extensions.
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "vtt", "sub", "ass", "ssa"];

/// Get the extension (text after the last dot) in lowercase.
pub fn get_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Text before the last dot, or `None` when the name has no dot.
pub fn base_name(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(base, _)| base)
}

/// Check if a file is a video file based on extension.
pub fn is_video_file(filename: &str) -> bool {
    get_extension(filename)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check if a file is a subtitle file based on extension.
pub fn is_subtitle_file(filename: &str) -> bool {
    get_extension(filename)
        .map(|ext| SUBTITLE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

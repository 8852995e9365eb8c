//! Sidecar subtitle matching.
//!
//! Subtitles are paired with a video by filename prefix:
//! - `Movie.srt`      matches `Movie.mkv` exactly
//! - `Movie.en.srt`   matches through the dotted suffix form
//! - `Movie 2.srt`    also matches, through the plain prefix form
//!
//! The language is read from the last dot-separated token of the subtitle's
//! base name (`Movie.en.srt` → `en` / English).

use crate::models::drive::DriveEntry;
use crate::models::media::SubtitleFile;
use crate::utils::names::{base_name, is_subtitle_file};

/// Known language tokens and their labels.
const LANGUAGES: &[(&[&str], &str)] = &[
    (&["en", "eng", "english"], "English"),
    (&["es", "spa", "spanish"], "Spanish"),
    (&["fr", "fra", "french"], "French"),
    (&["de", "deu", "german"], "German"),
    (&["it", "ita", "italian"], "Italian"),
    (&["pt", "por", "portuguese"], "Portuguese"),
    (&["ja", "jpn", "japanese"], "Japanese"),
    (&["ko", "kor", "korean"], "Korean"),
    (&["zh", "chi", "chinese"], "Chinese"),
    (&["ru", "rus", "russian"], "Russian"),
    (&["ar", "ara", "arabic"], "Arabic"),
    (&["hi", "hin", "hindi"], "Hindi"),
];

/// Find the subtitle files among `candidates` that belong to `video_name`.
///
/// Candidate order is preserved. Comparisons are literal string prefixes.
pub fn find_matching_subtitles(video_name: &str, candidates: &[DriveEntry]) -> Vec<SubtitleFile> {
    let video_base = match base_name(video_name) {
        Some(base) => base.trim(),
        None => return Vec::new(),
    };
    if video_base.is_empty() {
        return Vec::new();
    }

    candidates
        .iter()
        .filter(|entry| is_subtitle_file(&entry.name))
        .filter(|entry| {
            let subtitle_base = base_name(entry.name.trim()).unwrap_or_default().trim();
            subtitle_matches(subtitle_base, video_base)
        })
        .map(|entry| {
            let (language, label) = parse_subtitle_language(&entry.name);
            SubtitleFile {
                id: entry.id.clone(),
                name: entry.name.clone(),
                language,
                label,
            }
        })
        .collect()
}

fn subtitle_matches(subtitle_base: &str, video_base: &str) -> bool {
    subtitle_base == video_base
        || subtitle_base.starts_with(&format!("{}.", video_base))
        || subtitle_base.starts_with(video_base)
}

/// Infer `(language code, label)` from a subtitle filename.
pub fn parse_subtitle_language(filename: &str) -> (String, String) {
    let base = base_name(filename).unwrap_or(filename);
    let token = base.rsplit('.').next().unwrap_or_default().to_lowercase();

    let label = LANGUAGES
        .iter()
        .find(|(tokens, _)| tokens.contains(&token.as_str()))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| capitalize(&token));

    let code = if token.chars().count() <= 3 {
        token
    } else {
        token.chars().take(2).collect()
    };

    (code, label)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(
            parse_subtitle_language("Movie.en.srt"),
            ("en".to_string(), "English".to_string())
        );
        assert_eq!(
            parse_subtitle_language("Movie.spa.srt"),
            ("spa".to_string(), "Spanish".to_string())
        );
        assert_eq!(
            parse_subtitle_language("Movie.Japanese.ass"),
            ("ja".to_string(), "Japanese".to_string())
        );
    }

    #[test]
    fn test_unknown_language() {
        assert_eq!(
            parse_subtitle_language("Movie.nl.srt"),
            ("nl".to_string(), "Nl".to_string())
        );
        assert_eq!(
            parse_subtitle_language("Movie.forced.srt"),
            ("fo".to_string(), "Forced".to_string())
        );
    }

    #[test]
    fn test_bare_subtitle_uses_title_token() {
        assert_eq!(
            parse_subtitle_language("Movie.srt"),
            ("mo".to_string(), "Movie".to_string())
        );
    }

    #[test]
    fn test_video_without_extension() {
        let candidates = vec![DriveEntry {
            id: "1".to_string(),
            name: "Movie.srt".to_string(),
            ..Default::default()
        }];
        assert!(find_matching_subtitles("Movie", &candidates).is_empty());
    }
}

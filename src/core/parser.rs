//! Filename grammar parser.
//!
//! Turns human-authored video filenames into structured media identity.
//! Supported naming conventions:
//! - `Show Name (2005) - s01e02 - Episode Title.mkv`
//! - `Show Name (2005) - s01e01-e03.avi` (multi-episode)
//! - `Show Name (2005) - s01e01 - pt1.avi` (multi-part)
//! - `Show Name (2005) - 2011-11-15 - Guest Name.avi` (dated episode)
//! - `Movie Name (2020).mp4`
//! - `{tmdb-12345}` / `{tvdb-12345}` tags anywhere in the name
//!
//! Patterns are tried in a fixed order and the first match wins. The year
//! group tolerates a missing closing parenthesis (`Title (2020.mkv`).

use crate::models::media::{MediaType, ParsedFilename};
use regex::Regex;
use std::sync::LazyLock;

static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([a-zA-Z0-9]+)$").expect("valid extension regex"));

pub(crate) static TMDB_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{tmdb-(\d+)\}").expect("valid tmdb tag regex"));

pub(crate) static TVDB_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{tvdb-(\d+)\}").expect("valid tvdb tag regex"));

static EPISODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(.+?)(?:\s*\((\d{4})\)?)?\s*-\s*s(\d+)e(\d+)(?:-e(\d+))?(?:\s*-\s*(?:pt(\d+)|(.+)))?$",
    )
    .expect("valid episode regex")
});

static DATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)(?:\s*\((\d{4})\)?)?\s*-\s*(\d{4}-\d{2}-\d{2})(?:\s*-\s*(.+))?$")
        .expect("valid dated episode regex")
});

static MOVIE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)(?:\s*\((\d{4})\)?)?$").expect("valid movie regex")
});

/// Which grammar rule matched a cleaned name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    /// `Title (Year) - sXXeYY[-eZZ][ - ptN | - Episode Title]`
    Episode {
        title: String,
        year: Option<u16>,
        season: u32,
        episode: u32,
        episode_end: Option<u32>,
        part: Option<u32>,
        episode_title: Option<String>,
    },
    /// `Title (Year) - YYYY-MM-DD[ - Episode Title]`
    Dated {
        title: String,
        year: Option<u16>,
        date: String,
        episode_title: Option<String>,
    },
    /// `Title (Year)`, or the whole name when nothing else matched.
    Movie { title: String, year: Option<u16> },
}

/// External IDs carried as `{tmdb-N}` / `{tvdb-N}` tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalIds {
    pub tmdb_id: Option<u64>,
    pub tvdb_id: Option<u64>,
}

/// Parse a video filename.
///
/// Returns `None` only when the name has no extension; every other input
/// degrades to a movie record.
pub fn parse_media_filename(filename: &str) -> Option<ParsedFilename> {
    let ext_match = EXTENSION_RE.captures(filename)?;
    let extension = ext_match.get(1)?.as_str().to_lowercase();
    let name_without_ext = &filename[..ext_match.get(0)?.start()];

    let (clean_name, ids) = strip_external_ids(name_without_ext);

    let mut parsed = ParsedFilename {
        title: String::new(),
        year: None,
        season_number: None,
        episode_number: None,
        episode_end_number: None,
        episode_title: None,
        part: None,
        date: None,
        tmdb_id: ids.tmdb_id,
        tvdb_id: ids.tvdb_id,
        extension,
        media_type: MediaType::Movie,
    };

    match match_name(&clean_name) {
        NameMatch::Episode {
            title,
            year,
            season,
            episode,
            episode_end,
            part,
            episode_title,
        } => {
            parsed.title = title;
            parsed.year = year;
            parsed.season_number = Some(season);
            parsed.episode_number = Some(episode);
            parsed.episode_end_number = episode_end;
            parsed.part = part;
            parsed.episode_title = episode_title;
            parsed.media_type = MediaType::TvShow;
        }
        NameMatch::Dated {
            title,
            year,
            date,
            episode_title,
        } => {
            parsed.title = title;
            parsed.year = year;
            parsed.date = Some(date);
            parsed.episode_title = episode_title;
            parsed.media_type = MediaType::TvShow;
        }
        NameMatch::Movie { title, year } => {
            parsed.title = title;
            parsed.year = year;
        }
    }

    Some(parsed)
}

/// Extract `{tmdb-N}` and `{tvdb-N}` tags and remove every tag from the name.
pub fn strip_external_ids(name: &str) -> (String, ExternalIds) {
    let ids = ExternalIds {
        tmdb_id: capture_number(&TMDB_TAG_RE, name),
        tvdb_id: capture_number(&TVDB_TAG_RE, name),
    };

    let without_tmdb = TMDB_TAG_RE.replace_all(name, "");
    let clean = TVDB_TAG_RE.replace_all(&without_tmdb, "");

    (clean.trim().to_string(), ids)
}

/// Run the grammar rules against a name with extension and ID tags removed.
pub fn match_name(clean_name: &str) -> NameMatch {
    if let Some(m) = match_episode(clean_name) {
        return m;
    }
    if let Some(m) = match_dated(clean_name) {
        return m;
    }
    if let Some(m) = match_movie(clean_name) {
        return m;
    }

    NameMatch::Movie {
        title: clean_name.trim().to_string(),
        year: None,
    }
}

fn match_episode(name: &str) -> Option<NameMatch> {
    let caps = EPISODE_RE.captures(name)?;

    Some(NameMatch::Episode {
        title: caps.get(1)?.as_str().trim().to_string(),
        year: caps.get(2).and_then(|m| m.as_str().parse().ok()),
        season: saturating_number(caps.get(3)?.as_str()),
        episode: saturating_number(caps.get(4)?.as_str()),
        episode_end: caps.get(5).map(|m| saturating_number(m.as_str())),
        part: caps.get(6).map(|m| saturating_number(m.as_str())),
        episode_title: caps.get(7).map(|m| m.as_str().trim().to_string()),
    })
}

/// Digit run as a number, clamped to `u32::MAX` on overflow.
fn saturating_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

fn match_dated(name: &str) -> Option<NameMatch> {
    let caps = DATED_RE.captures(name)?;

    Some(NameMatch::Dated {
        title: caps.get(1)?.as_str().trim().to_string(),
        year: caps.get(2).and_then(|m| m.as_str().parse().ok()),
        date: caps.get(3)?.as_str().to_string(),
        episode_title: caps.get(4).map(|m| m.as_str().trim().to_string()),
    })
}

fn match_movie(name: &str) -> Option<NameMatch> {
    let caps = MOVIE_RE.captures(name)?;

    Some(NameMatch::Movie {
        title: caps.get(1)?.as_str().trim().to_string(),
        year: caps.get(2).and_then(|m| m.as_str().parse().ok()),
    })
}

pub(crate) fn capture_number(re: &Regex, text: &str) -> Option<u64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

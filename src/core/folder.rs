//! Folder grammar parser.
//!
//! Show folders look like `Doctor Who (1963)` or
//! `The Office (UK) (2001) {tmdb-2996}`; season folders look like
//! `Season 01`, `Season 1` or `Specials`.

use super::parser::{capture_number, TMDB_TAG_RE, TVDB_TAG_RE};
use crate::models::media::ShowFolderInfo;
use regex::Regex;
use std::sync::LazyLock;

static TRAILING_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)\s*$").expect("valid year regex"));

static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)season\s*(\d+)").expect("valid season regex"));

/// Parse a TV show folder name.
///
/// Strips one `{tmdb-N}` tag, then one `{tvdb-N}` tag, then a trailing
/// `(YYYY)` year. Returns `None` if nothing is left for the title.
pub fn parse_show_folder(folder_name: &str) -> Option<ShowFolderInfo> {
    let mut name = folder_name.trim().to_string();

    let tmdb_id = take_tag(&TMDB_TAG_RE, &mut name);
    let tvdb_id = take_tag(&TVDB_TAG_RE, &mut name);

    let mut year = None;
    if let Some(caps) = TRAILING_YEAR_RE.captures(&name) {
        year = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let start = caps.get(0).map(|m| m.start()).unwrap_or(name.len());
        name.truncate(start);
        name = name.trim().to_string();
    }

    if name.is_empty() {
        return None;
    }

    Some(ShowFolderInfo {
        title: name,
        year,
        tmdb_id,
        tvdb_id,
    })
}

/// Parse a season folder name into a season number (0 for specials).
pub fn parse_season_folder(folder_name: &str) -> Option<u32> {
    if let Some(caps) = SEASON_RE.captures(folder_name) {
        return caps.get(1).and_then(|m| m.as_str().parse().ok());
    }

    if folder_name.to_lowercase() == "specials" {
        return Some(0);
    }

    None
}

/// Remove the first match of `re` from `name`, returning its numeric capture.
fn take_tag(re: &Regex, name: &mut String) -> Option<u64> {
    let range = re.find(name)?.range();
    let id = capture_number(re, name);
    name.replace_range(range, "");
    *name = name.trim().to_string();
    id
}

//! Parse command implementation.
//!
//! Prints the parse result for each name as JSON.

use crate::core::folder::{parse_season_folder, parse_show_folder};
use crate::core::parser::parse_media_filename;
use crate::Result;
use colored::Colorize;

/// How names given on the command line are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseKind {
    File,
    ShowFolder,
    SeasonFolder,
}

/// Parse each name and print the result.
pub fn parse_names(names: &[String], kind: ParseKind) -> Result<()> {
    for name in names {
        let value = parse_to_json(name, kind)?;
        if value.is_null() {
            println!("{} {}", "[NO MATCH]".yellow(), name);
        } else {
            println!("{} {}", "[OK]".green(), name.bold());
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

/// Parse result as JSON; `null` when the name does not parse.
pub fn parse_to_json(name: &str, kind: ParseKind) -> Result<serde_json::Value> {
    let value = match kind {
        ParseKind::File => serde_json::to_value(parse_media_filename(name))?,
        ParseKind::ShowFolder => serde_json::to_value(parse_show_folder(name))?,
        ParseKind::SeasonFolder => serde_json::to_value(
            parse_season_folder(name).map(|n| serde_json::json!({ "seasonNumber": n })),
        )?,
    };
    Ok(value)
}

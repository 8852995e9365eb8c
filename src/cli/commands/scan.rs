//! Scan command implementation.

use super::build_scanner;
use crate::models::config::Config;
use crate::models::media::MediaLibrary;
use crate::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Scan the library once.
pub async fn scan(config: &Config, output: Option<&Path>) -> Result<()> {
    println!("{}", "Scanning drive library...".bold().cyan());
    println!();

    let (_, scanner) = build_scanner(config)?;

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Listing folders and fetching metadata");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = scanner.scan_library().await;
    spinner.finish_and_clear();
    let library = result?;

    print_summary(&library);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&library)?;
        std::fs::write(path, json)?;
        println!();
        println!("{} {}", "Saved library to".green(), path.display());
    }

    Ok(())
}

fn print_summary(library: &MediaLibrary) {
    println!("{} {}", "Movies:".bold(), library.movies.len());
    for movie in &library.movies {
        let year = movie.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        let enriched = if movie.tmdb_id.is_some() { "" } else { " [no metadata]" };
        println!("  {}{}{}", movie.title, year, enriched.dimmed());
    }

    println!();
    println!("{} {}", "TV shows:".bold(), library.tv_shows.len());
    for show in &library.tv_shows {
        println!(
            "  {} - {} seasons, {} episodes",
            show.title,
            show.seasons.len(),
            show.total_episodes
        );
    }
}

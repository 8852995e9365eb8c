//! CLI command implementations.

pub mod convert;
pub mod parse;
pub mod scan;
pub mod serve;

use crate::core::scanner::{LibraryScanner, ScanOptions};
use crate::models::config::Config;
use crate::services::drive::GoogleDriveClient;
use crate::services::tmdb::{TmdbClient, TmdbConfig};
use crate::Result;
use std::sync::Arc;

/// Build the drive client and a scanner over it, with TMDB enrichment when
/// an API key is configured.
pub fn build_scanner(config: &Config) -> Result<(Arc<GoogleDriveClient>, LibraryScanner)> {
    let drive = Arc::new(GoogleDriveClient::from_config(&config.drive)?);
    let options = ScanOptions::from_config(&config.library, &config.scanner);
    let mut scanner = LibraryScanner::new(drive.clone(), drive.clone(), options);

    match TmdbConfig::from_app_config(&config.tmdb) {
        Ok(tmdb_config) => {
            scanner = scanner.with_metadata(Arc::new(TmdbClient::new(tmdb_config)));
        }
        Err(_) => tracing::warn!("TMDB API key not configured, skipping metadata enrichment"),
    }

    Ok((drive, scanner))
}

//! TMDB API preflight check.

use super::CheckResult;
use crate::models::config::TmdbConfig as AppTmdbConfig;
use crate::services::tmdb::{TmdbClient, TmdbConfig};

/// Check if TMDB API is accessible. A missing key only disables enrichment.
pub async fn check(config: &AppTmdbConfig) -> CheckResult {
    match TmdbConfig::from_app_config(config) {
        Ok(tmdb_config) => match TmdbClient::new(tmdb_config).verify_api_key().await {
            Ok(true) => CheckResult::ok("TMDB API", "connected"),
            Ok(false) => CheckResult::fail(
                "TMDB API",
                "invalid API key",
                "Check your TMDB_API_KEY environment variable",
            ),
            Err(_) => CheckResult::fail(
                "TMDB API",
                "connection failed",
                "Check your network connection",
            ),
        },
        Err(_) => CheckResult::warn(
            "TMDB API",
            "API key not configured, metadata enrichment disabled",
            "Set TMDB_API_KEY environment variable",
        ),
    }
}

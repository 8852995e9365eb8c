//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cloud drive configuration.
    pub drive: DriveConfig,
    /// TMDB configuration.
    pub tmdb: TmdbConfig,
    /// Library layout.
    pub library: LibraryConfig,
    /// Scanner tuning.
    pub scanner: ScannerConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Cloud drive configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Drive API base URL.
    pub api_base: String,
    /// OAuth access token.
    pub access_token: Option<String>,
    /// Folder that holds the "Movies" and "TV Shows" folders.
    pub root_folder: Option<String>,
    /// Whether the root lives on a shared (team) drive.
    pub team_drive: bool,
    /// Shared drive ID, when `team_drive` is set.
    pub shared_drive_id: Option<String>,
    /// Listing page size.
    pub page_size: u32,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Language for responses.
    pub language: String,
    /// How long responses are cached, in seconds.
    pub cache_ttl_secs: u64,
}

/// Library layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Name of the movies folder under the drive root.
    pub movies_folder: String,
    /// Name of the TV shows folder under the drive root.
    pub tv_folder: String,
    /// Maximum nesting depth below the movies folder.
    pub max_depth: usize,
}

/// Scanner tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Maximum concurrent metadata requests and folder builds.
    pub max_concurrent: usize,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/drive/v3".to_string(),
            access_token: None,
            root_folder: None,
            team_drive: false,
            shared_drive_id: None,
            page_size: 100,
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "en-US".to_string(),
            cache_ttl_secs: 86_400,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            movies_folder: "Movies".to_string(),
            tv_folder: "TV Shows".to_string(),
            max_depth: 8,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("GD_ACCESS_TOKEN") {
            self.drive.access_token = Some(token);
        }
        if let Some(root) = lookup("GD_ROOT_FOLDER") {
            self.drive.root_folder = Some(root);
        }
        if let Some(team) = lookup("GD_IS_TEAM_DRIVE") {
            self.drive.team_drive = team == "true";
        }
        if let Some(id) = lookup("GD_SHARED_DRIVE_ID") {
            self.drive.shared_drive_id = Some(id);
        }
        if let Some(key) = lookup("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(bind) = lookup("DRIVE_MEDIA_BIND") {
            self.server.bind = bind;
        }
    }
}

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("drive_media")
}

/// Load configuration from file, then apply environment overrides.
pub fn load_config() -> Config {
    let config_path = config_dir().join("config.toml");

    let mut config = Config::default();
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(parsed) => config = parsed,
                Err(e) => tracing::warn!("Ignoring invalid {}: {}", config_path.display(), e),
            },
            Err(e) => tracing::warn!("Failed to read {}: {}", config_path.display(), e),
        }
    }

    config.apply_env();
    config
}

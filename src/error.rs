//! Error types for drive-media.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for drive-media.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Drive access token not configured. Set GD_ACCESS_TOKEN environment variable")]
    DriveTokenMissing,

    #[error("Drive root folder not configured. Set GD_ROOT_FOLDER environment variable")]
    DriveRootMissing,

    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    // Lookup errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // Upstream errors
    #[error("Drive API error: {0}")]
    DriveApi(String),

    #[error("TMDB API error: {0}")]
    TmdbApi(String),

    #[error("Stream error: {0}")]
    Stream(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not-found error for the given entity description.
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Error::NotFound(what.into())
    }

    /// Whether this error means the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

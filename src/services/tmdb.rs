//! TMDB API client.
//!
//! Responses are cached in memory for `cache_ttl` so repeated scans within
//! that window do not hit the API again.

use super::MetadataProvider;
use crate::models::media::{EpisodeDetails, MediaDetails, MediaType, SeasonSummary};
use crate::{Error, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key or Bearer token (JWT)
    pub api_key: String,
    pub language: String,
    /// Whether to use Bearer token authentication (API v4 style)
    pub use_bearer: bool,
    /// How long a response stays cached.
    pub cache_ttl: Duration,
}

impl TmdbConfig {
    /// Create config from the application's TMDB section.
    /// Supports both API key (v3) and Bearer token (v4) formats.
    pub fn from_app_config(config: &crate::models::config::TmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(Error::TmdbApiKeyMissing)?;

        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");

        Ok(Self {
            api_key,
            language: config.language.clone(),
            use_bearer,
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
        })
    }
}

struct CachedResponse {
    fetched_at: Instant,
    body: serde_json::Value,
}

/// TMDB API client.
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
    base_url: String,
    cache: DashMap<String, CachedResponse>,
}

/// Search result page.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub results: Vec<SearchItem>,
}

/// Search item (movie or TV).
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: u64,
}

/// Movie details.
#[derive(Debug, Deserialize)]
pub struct MovieDetails {
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub runtime: Option<u32>,
    pub vote_average: Option<f32>,
}

/// TV show details.
#[derive(Debug, Deserialize)]
pub struct TvDetails {
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub seasons: Vec<TvSeason>,
}

/// Season entry within TV details.
#[derive(Debug, Deserialize)]
pub struct TvSeason {
    pub season_number: u32,
    pub poster_path: Option<String>,
}

/// Season details.
#[derive(Debug, Deserialize)]
pub struct SeasonDetails {
    #[serde(default)]
    pub episodes: Vec<EpisodeInfo>,
}

/// Episode info within a season.
#[derive(Debug, Deserialize)]
pub struct EpisodeInfo {
    pub episode_number: u32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub still_path: Option<String>,
}

/// Full image URL for a TMDB image path.
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}{}", TMDB_IMAGE_BASE, size, p))
}

/// Map a response status: `Ok(true)` to read the body, `Ok(false)` when
/// TMDB has no such entry, an error for anything else.
fn check_status(status: StatusCode) -> Result<bool> {
    if status.is_success() {
        Ok(true)
    } else if status == StatusCode::NOT_FOUND {
        Ok(false)
    } else {
        Err(Error::TmdbApi(format!("request failed with {}", status)))
    }
}

impl From<MovieDetails> for MediaDetails {
    fn from(movie: MovieDetails) -> Self {
        MediaDetails {
            overview: movie.overview,
            poster_url: image_url(movie.poster_path.as_deref(), "w500"),
            backdrop_url: image_url(movie.backdrop_path.as_deref(), "w780"),
            rating: movie.vote_average,
            runtime: movie.runtime.filter(|r| *r > 0),
            seasons: Vec::new(),
        }
    }
}

impl From<TvDetails> for MediaDetails {
    fn from(tv: TvDetails) -> Self {
        MediaDetails {
            overview: tv.overview,
            poster_url: image_url(tv.poster_path.as_deref(), "w500"),
            backdrop_url: image_url(tv.backdrop_path.as_deref(), "w780"),
            rating: tv.vote_average,
            runtime: None,
            seasons: tv
                .seasons
                .into_iter()
                .map(|s| SeasonSummary {
                    season_number: s.season_number,
                    poster_url: image_url(s.poster_path.as_deref(), "w300"),
                })
                .collect(),
        }
    }
}

impl From<EpisodeInfo> for EpisodeDetails {
    fn from(ep: EpisodeInfo) -> Self {
        EpisodeDetails {
            episode_number: ep.episode_number,
            name: ep.name,
            overview: ep.overview,
            air_date: ep.air_date,
            still_url: image_url(ep.still_path.as_deref(), "w300"),
        }
    }
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Self {
        Self::with_base_url(config, TMDB_BASE_URL)
    }

    /// Create a client against a different API root.
    pub fn with_base_url(config: TmdbConfig, base_url: &str) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: DashMap::new(),
        }
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.config.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.config.use_bearer {
            format!(
                "{}/{}?language={}{}",
                self.base_url, path, self.config.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                self.base_url, path, self.config.api_key, self.config.language, extra_params
            )
        }
    }

    /// Cached body for `url`. Entries older than the TTL are evicted.
    fn cached(&self, url: &str) -> Option<serde_json::Value> {
        let ttl = self.config.cache_ttl;
        self.cache
            .remove_if(url, |_, cached| cached.fetched_at.elapsed() >= ttl);
        self.cache.get(url).map(|cached| cached.body.clone())
    }

    fn store(&self, url: &str, body: serde_json::Value) {
        self.cache.insert(
            url.to_string(),
            CachedResponse {
                fetched_at: Instant::now(),
                body,
            },
        );
    }

    /// GET a JSON resource through the cache. A 404 yields `None`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        if let Some(body) = self.cached(url) {
            return Ok(Some(serde_json::from_value(body)?));
        }

        let resp = self.build_request(url).send().await?;
        if !check_status(resp.status())? {
            tracing::debug!("TMDB has no entry for request");
            return Ok(None);
        }

        let body: serde_json::Value = resp.json().await?;
        let parsed = serde_json::from_value(body.clone())?;
        self.store(url, body);

        Ok(Some(parsed))
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = if self.config.use_bearer {
            format!("{}/authentication", self.base_url)
        } else {
            format!(
                "{}/authentication?api_key={}",
                self.base_url, self.config.api_key
            )
        };

        match self.build_request(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Search for movies.
    pub async fn search_movie(&self, query: &str, year: Option<u16>) -> Result<Vec<SearchItem>> {
        let year_param = year.map(|y| format!("&year={}", y)).unwrap_or_default();
        let url = self.build_url(
            "search/movie",
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );

        let resp: Option<SearchResult> = self.get_json(&url).await?;
        Ok(resp.map(|r| r.results).unwrap_or_default())
    }

    /// Search for TV shows.
    pub async fn search_tv(&self, query: &str, year: Option<u16>) -> Result<Vec<SearchItem>> {
        let year_param = year
            .map(|y| format!("&first_air_date_year={}", y))
            .unwrap_or_default();
        let url = self.build_url(
            "search/tv",
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );

        let resp: Option<SearchResult> = self.get_json(&url).await?;
        Ok(resp.map(|r| r.results).unwrap_or_default())
    }

    /// Get movie details.
    pub async fn get_movie_details(&self, movie_id: u64) -> Result<Option<MovieDetails>> {
        let url = self.build_url(&format!("movie/{}", movie_id), "");
        self.get_json(&url).await
    }

    /// Get TV show details.
    pub async fn get_tv_details(&self, tv_id: u64) -> Result<Option<TvDetails>> {
        let url = self.build_url(&format!("tv/{}", tv_id), "");
        self.get_json(&url).await
    }

    /// Get season details.
    pub async fn get_season_details(
        &self,
        tv_id: u64,
        season_number: u32,
    ) -> Result<Option<SeasonDetails>> {
        let url = self.build_url(&format!("tv/{}/season/{}", tv_id, season_number), "");
        self.get_json(&url).await
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn lookup_by_id(&self, media_type: MediaType, id: u64) -> Result<Option<MediaDetails>> {
        match media_type {
            MediaType::Movie => Ok(self.get_movie_details(id).await?.map(MediaDetails::from)),
            MediaType::TvShow => Ok(self.get_tv_details(id).await?.map(MediaDetails::from)),
        }
    }

    async fn search_by_title(
        &self,
        media_type: MediaType,
        title: &str,
        year: Option<u16>,
    ) -> Result<Option<u64>> {
        let results = match media_type {
            MediaType::Movie => self.search_movie(title, year).await?,
            MediaType::TvShow => self.search_tv(title, year).await?,
        };
        Ok(results.first().map(|r| r.id))
    }

    async fn season_episodes(
        &self,
        show_id: u64,
        season_number: u32,
    ) -> Result<Option<Vec<EpisodeDetails>>> {
        let season = self.get_season_details(show_id, season_number).await?;
        Ok(season.map(|s| s.episodes.into_iter().map(EpisodeDetails::from).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> TmdbConfig {
        TmdbConfig {
            api_key: api_key.to_string(),
            language: "en-US".to_string(),
            use_bearer: api_key.starts_with("eyJ"),
            cache_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_build_url_v3() {
        let client = TmdbClient::new(config("abc"));
        assert_eq!(
            client.build_url("movie/603", ""),
            "https://api.themoviedb.org/3/movie/603?api_key=abc&language=en-US"
        );
    }

    #[test]
    fn test_build_url_bearer() {
        let client = TmdbClient::new(config("eyJtoken"));
        assert_eq!(
            client.build_url("search/tv", "&query=Lost"),
            "https://api.themoviedb.org/3/search/tv?language=en-US&query=Lost"
        );
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url(Some("/abc.jpg"), "w500").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(image_url(None, "w500"), None);
    }

    #[test]
    fn test_tv_details_conversion() {
        let tv: TvDetails = serde_json::from_str(
            r#"{
                "id": 2996, "name": "The Office", "overview": "Mockumentary",
                "poster_path": "/p.jpg", "backdrop_path": null,
                "first_air_date": "2001-07-09", "vote_average": 8.1,
                "genres": [{"id": 35, "name": "Comedy"}],
                "seasons": [{"season_number": 1, "poster_path": "/s1.jpg", "episode_count": 6}]
            }"#,
        )
        .unwrap();

        let details = MediaDetails::from(tv);
        assert_eq!(details.overview.as_deref(), Some("Mockumentary"));
        assert_eq!(
            details.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/p.jpg")
        );
        assert_eq!(details.backdrop_url, None);
        assert_eq!(details.seasons[0].season_number, 1);
        assert_eq!(
            details.seasons[0].poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w300/s1.jpg")
        );
    }

    #[test]
    fn test_episode_conversion_keeps_air_date() {
        let ep: EpisodeInfo = serde_json::from_str(
            r#"{"episode_number": 3, "name": "Pilot", "overview": null,
                "air_date": "2005-03-24", "still_path": "/e3.jpg"}"#,
        )
        .unwrap();

        let details = EpisodeDetails::from(ep);
        assert_eq!(details.air_date.as_deref(), Some("2005-03-24"));
        assert_eq!(
            details.still_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w300/e3.jpg")
        );
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).unwrap());
        assert!(!check_status(StatusCode::NOT_FOUND).unwrap());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED),
            Err(Error::TmdbApi(_))
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(Error::TmdbApi(_))
        ));
    }

    #[test]
    fn test_stale_cache_entry_is_evicted() {
        let mut cfg = config("abc");
        cfg.cache_ttl = Duration::ZERO;
        let client = TmdbClient::new(cfg);
        client.store("movie/1", serde_json::json!({"id": 1}));

        assert_eq!(client.cached("movie/1"), None);
        assert!(client.cache.is_empty());
    }

    #[test]
    fn test_fresh_cache_entry_is_served() {
        let client = TmdbClient::new(config("abc"));
        client.store("movie/1", serde_json::json!({"id": 1}));

        assert_eq!(client.cached("movie/1"), Some(serde_json::json!({"id": 1})));
        assert_eq!(client.cache.len(), 1);
    }

    #[test]
    fn test_config_requires_key() {
        let app = crate::models::config::TmdbConfig::default();
        assert!(matches!(
            TmdbConfig::from_app_config(&app),
            Err(Error::TmdbApiKeyMissing)
        ));
    }
}

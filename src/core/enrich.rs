//! Metadata enrichment for one scan pass.
//!
//! Wraps a [`MetadataProvider`] with:
//! - a semaphore bounding concurrent provider requests,
//! - in-flight deduplication, so the same ID or title search is requested
//!   once per pass no matter how many entries need it,
//! - error swallowing: provider failures only reduce record richness.

use crate::models::media::{EpisodeDetails, MediaDetails, MediaType, Movie, Season, TvShow};
use crate::services::MetadataProvider;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};

type Shared<T> = Arc<OnceCell<T>>;

/// Per-scan enrichment context.
pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
    semaphore: Semaphore,
    details: DashMap<(MediaType, u64), Shared<Option<MediaDetails>>>,
    searches: DashMap<(MediaType, String, Option<u16>), Shared<Option<u64>>>,
    seasons: DashMap<(u64, u32), Shared<Option<Vec<EpisodeDetails>>>>,
}

impl Enricher {
    /// Create an enricher allowing `max_concurrent` provider requests at once.
    pub fn new(provider: Arc<dyn MetadataProvider>, max_concurrent: usize) -> Self {
        Self {
            provider,
            semaphore: Semaphore::new(max_concurrent.max(1)),
            details: DashMap::new(),
            searches: DashMap::new(),
            seasons: DashMap::new(),
        }
    }

    /// Resolve provider details: explicit ID first, else a title search.
    ///
    /// Returns the resolved ID alongside the details so callers can
    /// back-fill it.
    pub async fn resolve(
        &self,
        media_type: MediaType,
        explicit_id: Option<u64>,
        title: &str,
        year: Option<u16>,
    ) -> Option<(u64, MediaDetails)> {
        let id = match explicit_id {
            Some(id) => id,
            None => self.search(media_type, title, year).await?,
        };

        self.details(media_type, id).await.map(|details| (id, details))
    }

    /// Details for a provider ID, deduplicated within this pass.
    pub async fn details(&self, media_type: MediaType, id: u64) -> Option<MediaDetails> {
        let cell = self.details.entry((media_type, id)).or_default().clone();

        cell.get_or_init(|| async {
            let _permit = self.semaphore.acquire().await.ok()?;
            match self.provider.lookup_by_id(media_type, id).await {
                Ok(details) => details,
                Err(e) => {
                    tracing::warn!("Metadata lookup for {} {} failed: {}", media_type, id, e);
                    None
                }
            }
        })
        .await
        .clone()
    }

    /// Title search, deduplicated within this pass.
    pub async fn search(&self, media_type: MediaType, title: &str, year: Option<u16>) -> Option<u64> {
        if title.trim().is_empty() {
            return None;
        }

        let key = (media_type, title.to_lowercase(), year);
        let cell = self.searches.entry(key).or_default().clone();

        *cell
            .get_or_init(|| async {
                let _permit = self.semaphore.acquire().await.ok()?;
                match self.provider.search_by_title(media_type, title, year).await {
                    Ok(id) => id,
                    Err(e) => {
                        tracing::warn!("Metadata search for '{}' failed: {}", title, e);
                        None
                    }
                }
            })
            .await
    }

    /// Episodes of one season, deduplicated within this pass.
    pub async fn season_episodes(&self, show_id: u64, season_number: u32) -> Option<Vec<EpisodeDetails>> {
        let cell = self.seasons.entry((show_id, season_number)).or_default().clone();

        cell.get_or_init(|| async {
            let _permit = self.semaphore.acquire().await.ok()?;
            match self.provider.season_episodes(show_id, season_number).await {
                Ok(episodes) => episodes,
                Err(e) => {
                    tracing::warn!(
                        "Season lookup for {} season {} failed: {}",
                        show_id,
                        season_number,
                        e
                    );
                    None
                }
            }
        })
        .await
        .clone()
    }

    /// Merge provider fields into a movie.
    pub async fn enrich_movie(&self, mut movie: Movie) -> Movie {
        match self
            .resolve(MediaType::Movie, movie.tmdb_id, &movie.title, movie.year)
            .await
        {
            Some((id, details)) => {
                movie.tmdb_id = Some(id);
                apply_movie_details(&mut movie, details);
            }
            None => tracing::debug!("No metadata for movie '{}'", movie.title),
        }
        movie
    }

    /// Merge provider fields into a show, its season posters and episodes.
    pub async fn enrich_show(&self, mut show: TvShow) -> TvShow {
        let Some((id, details)) = self
            .resolve(MediaType::TvShow, show.tmdb_id, &show.title, show.year)
            .await
        else {
            tracing::debug!("No metadata for show '{}'", show.title);
            return show;
        };

        show.tmdb_id = Some(id);
        show.poster = details.poster_url.clone();
        show.backdrop = details.backdrop_url.clone();
        show.overview = details.overview.clone();
        show.rating = details.rating;

        for season in &mut show.seasons {
            if let Some(summary) = details
                .seasons
                .iter()
                .find(|s| s.season_number == season.season_number)
            {
                if summary.poster_url.is_some() {
                    season.poster = summary.poster_url.clone();
                }
            }
        }

        for season in &mut show.seasons {
            if let Some(episodes) = self.season_episodes(id, season.season_number).await {
                fill_episodes(season, &episodes);
            }
        }

        show
    }
}

/// Copy poster/backdrop/overview/rating/runtime onto a movie.
pub fn apply_movie_details(movie: &mut Movie, details: MediaDetails) {
    movie.poster = details.poster_url;
    movie.backdrop = details.backdrop_url;
    movie.overview = details.overview;
    movie.rating = details.rating;
    movie.runtime = details.runtime;
}

/// Fill episode fields that storage left empty.
///
/// Storage thumbnails and titles always win over provider values. Empty
/// provider strings are ignored.
pub fn fill_episodes(season: &mut Season, provider_episodes: &[EpisodeDetails]) {
    for episode in &mut season.episodes {
        let Some(info) = provider_episodes
            .iter()
            .find(|e| e.episode_number == episode.episode_number)
        else {
            continue;
        };

        if episode.thumbnail.is_none() {
            episode.thumbnail = info.still_url.clone();
        }
        if episode.title.is_none() {
            episode.title = info.name.clone().filter(|n| !n.is_empty());
        }
        if episode.overview.is_none() {
            episode.overview = info.overview.clone().filter(|o| !o.is_empty());
        }
        if episode.air_date.is_none() {
            episode.air_date = info.air_date.clone().filter(|d| !d.is_empty());
        }
    }
}

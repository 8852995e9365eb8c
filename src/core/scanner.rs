//! Library scanner.
//!
//! Walks the drive's "Movies" and "TV Shows" folders and assembles the
//! library graph:
//! - Movies may be nested any number of folders deep (bounded by
//!   `max_depth`); a folder id seen twice in one pass is a cycle and is
//!   not descended into again.
//! - TV shows follow `TV Shows/<Show>/<Season>/<episode files>`.
//!
//! A name that fails to parse or a sub-folder that fails to list is skipped,
//! never aborting the scan. Seasons and episodes are always sorted as the
//! final step, so output order does not depend on listing or completion order.

use super::enrich::{apply_movie_details, Enricher};
use super::folder::{parse_season_folder, parse_show_folder};
use super::parser::parse_media_filename;
use super::subtitles::find_matching_subtitles;
use crate::models::config::{LibraryConfig, ScannerConfig};
use crate::models::drive::DriveEntry;
use crate::models::media::{
    Episode, MediaFile, MediaLibrary, MediaType, Movie, ParsedFilename, Season, TvShow, VideoInfo,
};
use crate::services::{ContentSource, FolderSource, MetadataProvider};
use crate::utils::names::is_video_file;
use crate::{Error, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;

/// Scan options.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Name of the movies folder under the drive root.
    pub movies_folder: String,
    /// Name of the TV shows folder under the drive root.
    pub tv_folder: String,
    /// Maximum folder depth below the movies folder.
    pub max_depth: usize,
    /// Maximum concurrent metadata requests and show builds.
    pub max_concurrent: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&LibraryConfig::default(), &ScannerConfig::default())
    }
}

impl ScanOptions {
    /// Build from the library and scanner sections of the app config.
    pub fn from_config(library: &LibraryConfig, tuning: &ScannerConfig) -> Self {
        Self {
            movies_folder: library.movies_folder.clone(),
            tv_folder: library.tv_folder.clone(),
            max_depth: library.max_depth,
            max_concurrent: tuning.max_concurrent.max(1),
        }
    }
}

/// Builds [`MediaLibrary`] records from drive listings.
pub struct LibraryScanner {
    folders: Arc<dyn FolderSource>,
    content: Arc<dyn ContentSource>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    config: ScanOptions,
}

impl LibraryScanner {
    /// Create a scanner without metadata enrichment.
    pub fn new(
        folders: Arc<dyn FolderSource>,
        content: Arc<dyn ContentSource>,
        config: ScanOptions,
    ) -> Self {
        Self {
            folders,
            content,
            metadata: None,
            config,
        }
    }

    /// Enable metadata enrichment through `provider`.
    pub fn with_metadata(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    /// Scan options.
    pub fn config(&self) -> &ScanOptions {
        &self.config
    }

    fn enricher(&self) -> Option<Enricher> {
        self.metadata
            .as_ref()
            .map(|provider| Enricher::new(provider.clone(), self.config.max_concurrent))
    }

    /// Scan the whole library.
    pub async fn scan_library(&self) -> Result<MediaLibrary> {
        let enricher = self.enricher();

        let movies = match self
            .folders
            .find_folder_by_name(&self.config.movies_folder, None)
            .await?
        {
            Some(folder) => self.scan_movies_folder(&folder.id, enricher.as_ref()).await?,
            None => {
                tracing::info!("No '{}' folder found", self.config.movies_folder);
                Vec::new()
            }
        };

        let tv_shows = match self
            .folders
            .find_folder_by_name(&self.config.tv_folder, None)
            .await?
        {
            Some(folder) => self.scan_tv_folder(&folder.id, enricher.as_ref()).await?,
            None => {
                tracing::info!("No '{}' folder found", self.config.tv_folder);
                Vec::new()
            }
        };

        tracing::info!(
            "Scanned library: {} movies, {} TV shows",
            movies.len(),
            tv_shows.len()
        );

        Ok(MediaLibrary {
            movies,
            tv_shows,
            last_scanned: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Scan a movies folder tree.
    ///
    /// Each folder's pages are accumulated before its movies are built, and
    /// subtitles are matched against that folder's full listing. Movies are
    /// returned in discovery order.
    pub async fn scan_movies_folder(
        &self,
        root_id: &str,
        enricher: Option<&Enricher>,
    ) -> Result<Vec<Movie>> {
        let mut movies = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pending: Vec<(String, usize)> = vec![(root_id.to_string(), 0)];

        while let Some((folder_id, depth)) = pending.pop() {
            if !visited.insert(folder_id.clone()) {
                tracing::warn!("Folder {} already visited, skipping cycle", folder_id);
                continue;
            }

            let entries = match self.folders.list_all(&folder_id).await {
                Ok(entries) => entries,
                Err(e) if depth == 0 => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to list folder {}: {}", folder_id, e);
                    continue;
                }
            };

            let mut subfolders = Vec::new();
            for entry in &entries {
                if entry.is_folder() {
                    if depth < self.config.max_depth {
                        subfolders.push((entry.id.clone(), depth + 1));
                    } else {
                        tracing::warn!(
                            "Not descending into '{}': depth limit {} reached",
                            entry.name,
                            self.config.max_depth
                        );
                    }
                } else if is_video_file(&entry.name) {
                    match build_movie_entry(entry, &folder_id, &entries) {
                        Some(movie) => movies.push(movie),
                        None => tracing::debug!("Skipping unparseable file '{}'", entry.name),
                    }
                }
            }

            // Reverse so the first listed subfolder is scanned next.
            pending.extend(subfolders.into_iter().rev());
        }

        let Some(enricher) = enricher else {
            return Ok(movies);
        };

        let enriched: Vec<Movie> = stream::iter(movies)
            .map(|movie| enricher.enrich_movie(movie))
            .buffered(self.config.max_concurrent)
            .collect()
            .await;

        Ok(enriched)
    }

    /// Scan the TV shows folder.
    ///
    /// Shows without any episodes are dropped.
    pub async fn scan_tv_folder(
        &self,
        folder_id: &str,
        enricher: Option<&Enricher>,
    ) -> Result<Vec<TvShow>> {
        let show_folders = self.folders.list_subfolders(folder_id).await?;

        let shows: Vec<Option<TvShow>> = stream::iter(show_folders)
            .map(|folder| async move {
                match self.build_show(&folder, false).await {
                    Ok(Some(show)) if show.total_episodes > 0 => match enricher {
                        Some(enricher) => Some(enricher.enrich_show(show).await),
                        None => Some(show),
                    },
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!("Failed to scan show folder '{}': {}", folder.name, e);
                        None
                    }
                }
            })
            .buffered(self.config.max_concurrent)
            .collect()
            .await;

        Ok(shows.into_iter().flatten().collect())
    }

    /// Build a single show from its folder id, with enrichment.
    ///
    /// Unlike the library scan, seasons without episodes are kept.
    pub async fn scan_show(&self, folder_id: &str) -> Result<TvShow> {
        let folder = self
            .content
            .file_metadata(folder_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("TV show {}", folder_id)))?;

        let show = self
            .build_show(&folder, true)
            .await?
            .ok_or_else(|| Error::BadRequest(format!("Could not parse folder name '{}'", folder.name)))?;

        match self.enricher() {
            Some(enricher) => Ok(enricher.enrich_show(show).await),
            None => Ok(show),
        }
    }

    /// Build a single enriched movie from its file id.
    pub async fn build_movie(&self, file_id: &str) -> Result<Movie> {
        let file = self
            .content
            .file_metadata(file_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("movie {}", file_id)))?;

        let folder_id = file.parent_id().unwrap_or_default().to_string();
        let siblings = if folder_id.is_empty() {
            Vec::new()
        } else {
            self.folders.list_all(&folder_id).await.unwrap_or_else(|e| {
                tracing::warn!("Failed to list folder {}: {}", folder_id, e);
                Vec::new()
            })
        };

        let mut movie = build_movie_entry(&file, &folder_id, &siblings)
            .ok_or_else(|| Error::BadRequest(format!("Could not parse filename '{}'", file.name)))?;

        if let Some(enricher) = self.enricher() {
            if let Some((id, details)) = enricher
                .resolve(MediaType::Movie, movie.tmdb_id, &movie.title, movie.year)
                .await
            {
                movie.tmdb_id = Some(id);
                apply_movie_details(&mut movie, details);
            }
        }

        Ok(movie)
    }

    /// Build the player payload for a video.
    ///
    /// When `folder_id` is absent (or `"unknown"`) the parent folder is read
    /// from the file's metadata. Without any parent the video plays with no
    /// subtitles.
    pub async fn video_info(&self, file_id: &str, folder_id: Option<&str>) -> Result<VideoInfo> {
        let folder_id = match folder_id.filter(|f| !f.is_empty() && *f != "unknown") {
            Some(folder_id) => folder_id.to_string(),
            None => {
                let file = self
                    .content
                    .file_metadata(file_id)
                    .await?
                    .ok_or_else(|| Error::not_found(format!("video {}", file_id)))?;

                match file.parent_id() {
                    Some(parent) => parent.to_string(),
                    None => {
                        let parsed = parse_media_filename(&file.name);
                        return Ok(video_info_from(file_id, "", parsed.as_ref(), Vec::new()));
                    }
                }
            }
        };

        let siblings = self.folders.list_all(&folder_id).await?;
        let video = siblings
            .iter()
            .find(|entry| entry.id == file_id)
            .ok_or_else(|| Error::not_found(format!("video {} in folder {}", file_id, folder_id)))?;

        let parsed = parse_media_filename(&video.name).ok_or_else(|| {
            Error::BadRequest(format!("Could not parse filename '{}'", video.name))
        })?;
        let subtitles = find_matching_subtitles(&video.name, &siblings);

        Ok(video_info_from(file_id, &folder_id, Some(&parsed), subtitles))
    }

    /// Build a show from its folder; `None` if the folder name does not parse.
    async fn build_show(&self, folder: &DriveEntry, keep_empty: bool) -> Result<Option<TvShow>> {
        let Some(info) = parse_show_folder(&folder.name) else {
            tracing::debug!("Skipping unparseable show folder '{}'", folder.name);
            return Ok(None);
        };

        let mut seasons: Vec<Season> = Vec::new();
        for season_folder in self.folders.list_subfolders(&folder.id).await? {
            let Some(season_number) = parse_season_folder(&season_folder.name) else {
                tracing::debug!("Skipping non-season folder '{}'", season_folder.name);
                continue;
            };

            let files = match self.folders.list_all(&season_folder.id).await {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!("Failed to list season folder '{}': {}", season_folder.name, e);
                    continue;
                }
            };

            let episodes: Vec<Episode> = files
                .iter()
                .filter(|file| is_video_file(&file.name))
                .filter_map(|file| {
                    let episode = build_episode(file, folder, &season_folder, &files);
                    if episode.is_none() {
                        tracing::debug!("Skipping file without episode number '{}'", file.name);
                    }
                    episode
                })
                .collect();

            match seasons.iter_mut().find(|s| s.season_number == season_number) {
                Some(existing) => existing.episodes.extend(episodes),
                None => seasons.push(Season {
                    season_number,
                    episodes,
                    episode_count: 0,
                    poster: None,
                }),
            }
        }

        Ok(Some(assemble_show(folder, info, seasons, keep_empty)))
    }
}

/// Sort, count and wrap seasons into a show.
fn assemble_show(
    folder: &DriveEntry,
    info: crate::models::media::ShowFolderInfo,
    mut seasons: Vec<Season>,
    keep_empty: bool,
) -> TvShow {
    for season in &mut seasons {
        season.episodes.sort_by_key(|e| e.episode_number);
        season.episode_count = season.episodes.len();
    }
    if !keep_empty {
        seasons.retain(|s| s.episode_count > 0);
    }
    seasons.sort_by_key(|s| s.season_number);

    let total_episodes = seasons.iter().map(|s| s.episode_count).sum();

    TvShow {
        id: folder.id.clone(),
        title: info.title,
        year: info.year,
        path: folder.name.clone(),
        seasons,
        total_episodes,
        thumbnail: None,
        poster: None,
        backdrop: None,
        overview: None,
        rating: None,
        tmdb_id: info.tmdb_id,
        tvdb_id: info.tvdb_id,
    }
}

fn media_file(entry: &DriveEntry) -> MediaFile {
    MediaFile {
        id: entry.id.clone(),
        name: entry.name.clone(),
        path: entry.name.clone(),
        mime_type: entry.mime_type.clone(),
        size: entry.size,
        modified_time: entry.modified_time.clone().unwrap_or_default(),
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Turn a video entry into an unenriched movie.
pub fn build_movie_entry(entry: &DriveEntry, folder_id: &str, siblings: &[DriveEntry]) -> Option<Movie> {
    let parsed = parse_media_filename(&entry.name)?;
    let subtitles = find_matching_subtitles(&entry.name, siblings);

    Some(Movie {
        id: entry.id.clone(),
        folder_id: folder_id.to_string(),
        title: parsed.title,
        year: parsed.year,
        path: entry.name.clone(),
        file: media_file(entry),
        subtitles: non_empty(subtitles),
        thumbnail: entry.thumbnail_link.clone(),
        poster: None,
        backdrop: None,
        overview: None,
        rating: None,
        runtime: None,
        tmdb_id: parsed.tmdb_id,
    })
}

/// Turn a video entry in a season folder into an episode.
///
/// Requires the filename to carry both season and episode numbers.
fn build_episode(
    file: &DriveEntry,
    show_folder: &DriveEntry,
    season_folder: &DriveEntry,
    siblings: &[DriveEntry],
) -> Option<Episode> {
    let parsed = parse_media_filename(&file.name)?;
    let season_number = parsed.season_number?;
    let episode_number = parsed.episode_number?;
    let subtitles = find_matching_subtitles(&file.name, siblings);

    Some(Episode {
        id: file.id.clone(),
        folder_id: season_folder.id.clone(),
        season_number,
        episode_number,
        title: parsed.episode_title,
        air_date: None,
        path: format!("{}/{}/{}", show_folder.name, season_folder.name, file.name),
        file: media_file(file),
        subtitles: non_empty(subtitles),
        thumbnail: file.thumbnail_link.clone(),
        overview: None,
    })
}

fn video_info_from(
    file_id: &str,
    folder_id: &str,
    parsed: Option<&ParsedFilename>,
    subtitles: Vec<crate::models::media::SubtitleFile>,
) -> VideoInfo {
    VideoInfo {
        id: file_id.to_string(),
        folder_id: folder_id.to_string(),
        title: parsed
            .map(|p| p.title.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        year: parsed.and_then(|p| p.year),
        season_number: parsed.and_then(|p| p.season_number),
        episode_number: parsed.and_then(|p| p.episode_number),
        episode_title: parsed.and_then(|p| p.episode_title.clone()),
        stream_url: format!("/api/stream/{}", file_id),
        subtitles,
    }
}

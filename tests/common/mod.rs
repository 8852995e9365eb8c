//! In-memory drive and metadata provider used by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use drive_media::models::drive::{ByteSpan, DriveEntry, FolderPage, FOLDER_MIME_TYPE};
use drive_media::models::media::{EpisodeDetails, MediaDetails, MediaType, SeasonSummary};
use drive_media::services::{ByteStream, ContentSource, FolderSource, MetadataProvider};
use drive_media::{Error, Result};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const ROOT: &str = "root";

/// A folder tree held in memory. Listings are paginated by `page_size`.
pub struct FakeDrive {
    children: HashMap<String, Vec<DriveEntry>>,
    contents: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    broken: HashSet<String>,
    page_size: usize,
    pub list_calls: AtomicUsize,
    pub fetched_spans: Mutex<Vec<Option<ByteSpan>>>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            contents: HashMap::new(),
            failing: HashSet::new(),
            broken: HashSet::new(),
            page_size: 2,
            list_calls: AtomicUsize::new(0),
            fetched_spans: Mutex::new(Vec::new()),
        }
    }

    pub fn folder(&mut self, parent: &str, id: &str, name: &str) -> &mut Self {
        self.push(parent, id, name, FOLDER_MIME_TYPE, None)
    }

    pub fn file(&mut self, parent: &str, id: &str, name: &str) -> &mut Self {
        self.push(parent, id, name, "video/x-matroska", Some(1024))
    }

    pub fn content(&mut self, parent: &str, id: &str, name: &str, mime: &str, data: &[u8]) -> &mut Self {
        self.contents.insert(id.to_string(), data.to_vec());
        self.push(parent, id, name, mime, Some(data.len() as u64))
    }

    /// Make listing `folder_id` fail.
    pub fn fail_listing(&mut self, folder_id: &str) -> &mut Self {
        self.failing.insert(folder_id.to_string());
        self
    }

    /// Make reading `file_id` fail after its first chunk.
    pub fn break_stream(&mut self, file_id: &str) -> &mut Self {
        self.broken.insert(file_id.to_string());
        self
    }

    fn push(&mut self, parent: &str, id: &str, name: &str, mime: &str, size: Option<u64>) -> &mut Self {
        self.children.entry(parent.to_string()).or_default().push(DriveEntry {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime.to_string(),
            size,
            modified_time: Some("2024-01-01T00:00:00Z".to_string()),
            thumbnail_link: None,
            parents: vec![parent.to_string()],
        });
        self
    }

    fn entries(&self, folder_id: &str) -> Result<&[DriveEntry]> {
        if self.failing.contains(folder_id) {
            return Err(Error::DriveApi(format!("listing {} failed", folder_id)));
        }
        Ok(self
            .children
            .get(folder_id)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

#[async_trait]
impl FolderSource for FakeDrive {
    async fn list(&self, folder_id: &str, page_token: Option<&str>) -> Result<FolderPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries(folder_id)?;

        let start: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let end = (start + self.page_size).min(entries.len());
        let next_page_token = if end < entries.len() {
            Some(end.to_string())
        } else {
            None
        };

        Ok(FolderPage {
            entries: entries[start..end].to_vec(),
            next_page_token,
        })
    }

    async fn list_subfolders(&self, folder_id: &str) -> Result<Vec<DriveEntry>> {
        Ok(self
            .entries(folder_id)?
            .iter()
            .filter(|e| e.is_folder())
            .cloned()
            .collect())
    }

    async fn find_folder_by_name(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<DriveEntry>> {
        Ok(self
            .entries(parent_id.unwrap_or(ROOT))?
            .iter()
            .find(|e| e.is_folder() && e.name == name)
            .cloned())
    }
}

#[async_trait]
impl ContentSource for FakeDrive {
    async fn file_metadata(&self, file_id: &str) -> Result<Option<DriveEntry>> {
        Ok(self
            .children
            .values()
            .flatten()
            .find(|e| e.id == file_id)
            .cloned())
    }

    async fn fetch(&self, file_id: &str, span: Option<ByteSpan>) -> Result<ByteStream> {
        self.fetched_spans.lock().unwrap().push(span);
        let data = self
            .contents
            .get(file_id)
            .ok_or_else(|| Error::not_found(file_id.to_string()))?;

        let slice = match span {
            Some(span) => data[span.start as usize..=span.end as usize].to_vec(),
            None => data.clone(),
        };

        // Two chunks, so consumers see a real stream.
        let mid = slice.len() / 2;
        let second = if self.broken.contains(file_id) {
            Err(Error::Stream("connection reset".to_string()))
        } else {
            Ok(Bytes::copy_from_slice(&slice[mid..]))
        };
        let chunks = vec![Ok(Bytes::copy_from_slice(&slice[..mid])), second];
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn fetch_text(&self, file_id: &str) -> Result<String> {
        let data = self
            .contents
            .get(file_id)
            .ok_or_else(|| Error::not_found(file_id.to_string()))?;
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

/// Metadata provider with canned answers and call counters.
#[derive(Default)]
pub struct FakeMetadata {
    pub details: HashMap<(MediaType, u64), MediaDetails>,
    pub titles: HashMap<String, u64>,
    pub seasons: HashMap<(u64, u32), Vec<EpisodeDetails>>,
    pub fail: bool,
    pub lookup_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub season_calls: AtomicUsize,
}

impl FakeMetadata {
    pub fn movie(mut self, id: u64, title: &str, poster: &str) -> Self {
        self.details.insert(
            (MediaType::Movie, id),
            MediaDetails {
                overview: Some(format!("About {}", title)),
                poster_url: Some(poster.to_string()),
                rating: Some(7.5),
                runtime: Some(120),
                ..Default::default()
            },
        );
        self.titles.insert(title.to_lowercase(), id);
        self
    }

    pub fn show(mut self, id: u64, title: &str, season_posters: &[(u32, &str)]) -> Self {
        self.details.insert(
            (MediaType::TvShow, id),
            MediaDetails {
                overview: Some(format!("About {}", title)),
                poster_url: Some(format!("poster-{}", id)),
                backdrop_url: Some(format!("backdrop-{}", id)),
                rating: Some(8.0),
                seasons: season_posters
                    .iter()
                    .map(|(number, poster)| SeasonSummary {
                        season_number: *number,
                        poster_url: Some(poster.to_string()),
                    })
                    .collect(),
                ..Default::default()
            },
        );
        self.titles.insert(title.to_lowercase(), id);
        self
    }

    pub fn episodes(mut self, show_id: u64, season: u32, names: &[&str]) -> Self {
        let episodes = names
            .iter()
            .enumerate()
            .map(|(i, name)| EpisodeDetails {
                episode_number: i as u32 + 1,
                name: Some(name.to_string()),
                overview: None,
                air_date: Some(format!("2005-03-{:02}", i + 1)),
                still_url: Some(format!("still-{}-{}", season, i + 1)),
            })
            .collect();
        self.seasons.insert((show_id, season), episodes);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn lookup_by_id(&self, media_type: MediaType, id: u64) -> Result<Option<MediaDetails>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::TmdbApi("unavailable".to_string()));
        }
        Ok(self.details.get(&(media_type, id)).cloned())
    }

    async fn search_by_title(
        &self,
        _media_type: MediaType,
        title: &str,
        _year: Option<u16>,
    ) -> Result<Option<u64>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::TmdbApi("unavailable".to_string()));
        }
        Ok(self.titles.get(&title.to_lowercase()).copied())
    }

    async fn season_episodes(
        &self,
        show_id: u64,
        season_number: u32,
    ) -> Result<Option<Vec<EpisodeDetails>>> {
        self.season_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::TmdbApi("unavailable".to_string()));
        }
        Ok(self.seasons.get(&(show_id, season_number)).cloned())
    }
}

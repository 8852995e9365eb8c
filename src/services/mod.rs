//! External collaborators.
//!
//! The core only talks to storage and the metadata provider through the
//! traits below; `drive` and `tmdb` hold the production implementations.

pub mod drive;
pub mod tmdb;

use crate::models::drive::{ByteSpan, DriveEntry, FolderPage};
use crate::models::media::{EpisodeDetails, MediaDetails, MediaType};
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Chunked file content.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Folder listing capability.
#[async_trait]
pub trait FolderSource: Send + Sync {
    /// List one page of a folder's children.
    async fn list(&self, folder_id: &str, page_token: Option<&str>) -> Result<FolderPage>;

    /// List the immediate subfolders of a folder.
    async fn list_subfolders(&self, folder_id: &str) -> Result<Vec<DriveEntry>>;

    /// Find a folder by exact name under `parent_id` (or the configured root).
    async fn find_folder_by_name(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<DriveEntry>>;

    /// List every page of a folder.
    async fn list_all(&self, folder_id: &str) -> Result<Vec<DriveEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list(folder_id, page_token.as_deref()).await?;
            entries.extend(page.entries);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(entries)
    }
}

/// File content capability.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch an entry's metadata; `None` when it does not exist.
    async fn file_metadata(&self, file_id: &str) -> Result<Option<DriveEntry>>;

    /// Stream a file's bytes, optionally limited to `span`.
    async fn fetch(&self, file_id: &str, span: Option<ByteSpan>) -> Result<ByteStream>;

    /// Download a small text file (subtitles) in full.
    async fn fetch_text(&self, file_id: &str) -> Result<String>;
}

/// Third-party metadata lookup.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Details for a known provider ID; `None` when the provider has no entry.
    async fn lookup_by_id(&self, media_type: MediaType, id: u64) -> Result<Option<MediaDetails>>;

    /// Best-match provider ID for a title and optional year.
    async fn search_by_title(
        &self,
        media_type: MediaType,
        title: &str,
        year: Option<u16>,
    ) -> Result<Option<u64>>;

    /// Episodes of one season of a TV show.
    async fn season_episodes(
        &self,
        show_id: u64,
        season_number: u32,
    ) -> Result<Option<Vec<EpisodeDetails>>>;
}

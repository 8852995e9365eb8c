//! Google Drive API client.
//!
//! Lists folders page by page and streams file content, forwarding byte
//! ranges to the `alt=media` endpoint.

use super::{ByteStream, ContentSource, FolderSource};
use crate::models::config::DriveConfig;
use crate::models::drive::{ByteSpan, DriveEntry, FolderPage, FOLDER_MIME_TYPE};
use crate::{Error, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::StatusCode;
use serde::Deserialize;

const FILE_FIELDS: &str = "id,name,mimeType,size,modifiedTime,thumbnailLink,parents";

/// Drive client configuration.
#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub api_base: String,
    pub access_token: String,
    pub root_folder: String,
    pub team_drive: bool,
    pub shared_drive_id: Option<String>,
    pub page_size: u32,
}

impl DriveSettings {
    /// Create settings from the application's drive section.
    pub fn from_app_config(config: &DriveConfig) -> Result<Self> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(Error::DriveTokenMissing)?;
        let root_folder = config
            .root_folder
            .clone()
            .filter(|r| !r.is_empty())
            .ok_or(Error::DriveRootMissing)?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token,
            root_folder,
            team_drive: config.team_drive,
            shared_drive_id: config.shared_drive_id.clone(),
            page_size: config.page_size.clamp(1, 1000),
        })
    }
}

/// Entry as returned by the API; `size` arrives as a decimal string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    size: Option<String>,
    modified_time: Option<String>,
    thumbnail_link: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
}

impl From<RawEntry> for DriveEntry {
    fn from(raw: RawEntry) -> Self {
        DriveEntry {
            id: raw.id,
            name: raw.name,
            mime_type: raw.mime_type,
            size: raw.size.and_then(|s| s.parse().ok()),
            modified_time: raw.modified_time,
            thumbnail_link: raw.thumbnail_link,
            parents: raw.parents,
        }
    }
}

/// files.list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<RawEntry>,
    next_page_token: Option<String>,
}

/// Escape a value for use inside a single-quoted Drive query literal.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Check an `alt=media` response status. A ranged request must come back
/// as 206; a 200 would carry the whole file instead of the span.
fn check_media_status(status: StatusCode, ranged: bool, file_id: &str) -> Result<()> {
    match status {
        StatusCode::NOT_FOUND => Err(Error::not_found(format!("file {}", file_id))),
        StatusCode::PARTIAL_CONTENT => Ok(()),
        status if status.is_success() && !ranged => Ok(()),
        status => Err(Error::Stream(format!(
            "upstream returned {} for {}",
            status, file_id
        ))),
    }
}

/// Google Drive API client.
pub struct GoogleDriveClient {
    settings: DriveSettings,
    client: reqwest::Client,
}

impl GoogleDriveClient {
    /// Create a new Drive client.
    pub fn new(settings: DriveSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from the application config.
    pub fn from_config(config: &DriveConfig) -> Result<Self> {
        Ok(Self::new(DriveSettings::from_app_config(config)?))
    }

    /// The configured library root folder.
    pub fn root_folder(&self) -> &str {
        &self.settings.root_folder
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url).bearer_auth(&self.settings.access_token)
    }

    /// Query parameters for files.list, including shared drive scoping.
    fn list_params(&self, query: &str, page_token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("fields", format!("nextPageToken,files({})", FILE_FIELDS)),
            ("orderBy", "folder,name".to_string()),
            ("pageSize", self.settings.page_size.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        if self.settings.team_drive {
            params.push(("supportsAllDrives", "true".to_string()));
            params.push(("includeItemsFromAllDrives", "true".to_string()));
            if let Some(drive_id) = &self.settings.shared_drive_id {
                params.push(("driveId", drive_id.clone()));
                params.push(("corpora", "drive".to_string()));
            }
        }
        params
    }

    async fn query_page(&self, query: &str, page_token: Option<&str>) -> Result<FolderPage> {
        let url = format!("{}/files", self.settings.api_base);
        let resp = self
            .build_request(&url)
            .query(&self.list_params(query, page_token))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::DriveApi(format!(
                "listing failed with {}",
                resp.status()
            )));
        }

        let list: FileList = resp.json().await?;
        Ok(FolderPage {
            entries: list.files.into_iter().map(DriveEntry::from).collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn query_all(&self, query: &str) -> Result<Vec<DriveEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.query_page(query, page_token.as_deref()).await?;
            entries.extend(page.entries);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(entries)
    }

    fn media_request(&self, file_id: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/files/{}",
            self.settings.api_base,
            urlencoding::encode(file_id)
        );
        let mut request = self.build_request(&url).query(&[("alt", "media")]);
        if self.settings.team_drive {
            request = request.query(&[("supportsAllDrives", "true")]);
        }
        request
    }

    /// Check that the token can read the root folder.
    pub async fn verify_access(&self) -> Result<bool> {
        match self.file_metadata(&self.settings.root_folder).await {
            Ok(Some(entry)) => Ok(entry.is_folder()),
            Ok(None) => Ok(false),
            Err(Error::Http(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl FolderSource for GoogleDriveClient {
    async fn list(&self, folder_id: &str, page_token: Option<&str>) -> Result<FolderPage> {
        let query = format!(
            "'{}' in parents and trashed = false",
            escape_query_value(folder_id)
        );
        self.query_page(&query, page_token).await
    }

    async fn list_subfolders(&self, folder_id: &str) -> Result<Vec<DriveEntry>> {
        let query = format!(
            "'{}' in parents and mimeType = '{}' and trashed = false",
            escape_query_value(folder_id),
            FOLDER_MIME_TYPE
        );
        self.query_all(&query).await
    }

    async fn find_folder_by_name(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<Option<DriveEntry>> {
        let parent = parent_id.unwrap_or(&self.settings.root_folder);
        let query = format!(
            "name = '{}' and '{}' in parents and mimeType = '{}' and trashed = false",
            escape_query_value(name),
            escape_query_value(parent),
            FOLDER_MIME_TYPE
        );
        let page = self.query_page(&query, None).await?;
        Ok(page.entries.into_iter().next())
    }
}

#[async_trait]
impl ContentSource for GoogleDriveClient {
    async fn file_metadata(&self, file_id: &str) -> Result<Option<DriveEntry>> {
        let url = format!(
            "{}/files/{}",
            self.settings.api_base,
            urlencoding::encode(file_id)
        );
        let mut request = self.build_request(&url).query(&[("fields", FILE_FIELDS)]);
        if self.settings.team_drive {
            request = request.query(&[("supportsAllDrives", "true")]);
        }

        let resp = request.send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Error::DriveApi(format!(
                "metadata for {} failed with {}",
                file_id,
                resp.status()
            )));
        }

        let raw: RawEntry = resp.json().await?;
        Ok(Some(raw.into()))
    }

    async fn fetch(&self, file_id: &str, span: Option<ByteSpan>) -> Result<ByteStream> {
        let mut request = self.media_request(file_id);
        if let Some(span) = span {
            request = request.header(reqwest::header::RANGE, span.header_value());
        }

        let resp = request.send().await?;
        check_media_status(resp.status(), span.is_some(), file_id)?;
        Ok(resp.bytes_stream().map_err(Error::from).boxed())
    }

    async fn fetch_text(&self, file_id: &str) -> Result<String> {
        let resp = self.media_request(file_id).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(Error::not_found(format!("file {}", file_id))),
            status if status.is_success() => Ok(resp.text().await?),
            status => Err(Error::DriveApi(format!(
                "download of {} failed with {}",
                file_id, status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(team_drive: bool) -> DriveSettings {
        DriveSettings {
            api_base: "https://drive.test/v3".to_string(),
            access_token: "token".to_string(),
            root_folder: "root".to_string(),
            team_drive,
            shared_drive_id: Some("shared".to_string()),
            page_size: 100,
        }
    }

    #[test]
    fn test_escape_query_value() {
        assert_eq!(escape_query_value("Ocean's Eleven"), "Ocean\\'s Eleven");
        assert_eq!(escape_query_value("plain"), "plain");
    }

    #[test]
    fn test_list_params_team_drive() {
        let client = GoogleDriveClient::new(settings(true));
        let params = client.list_params("q", Some("next"));
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert!(keys.contains(&"pageToken"));
        assert!(keys.contains(&"supportsAllDrives"));
        assert!(params.contains(&("corpora", "drive".to_string())));
        assert!(params.contains(&("driveId", "shared".to_string())));
    }

    #[test]
    fn test_list_params_personal_drive() {
        let client = GoogleDriveClient::new(settings(false));
        let params = client.list_params("q", None);
        assert!(!params.iter().any(|(k, _)| *k == "supportsAllDrives"));
        assert!(!params.iter().any(|(k, _)| *k == "pageToken"));
    }

    #[test]
    fn test_raw_entry_parses_size() {
        let raw: RawEntry = serde_json::from_str(
            r#"{"id": "f1", "name": "Movie.mkv", "mimeType": "video/x-matroska", "size": "1048576"}"#,
        )
        .unwrap();
        let entry = DriveEntry::from(raw);
        assert_eq!(entry.size, Some(1_048_576));
        assert!(entry.parents.is_empty());
    }

    #[test]
    fn test_ranged_fetch_requires_partial_content() {
        assert!(check_media_status(StatusCode::PARTIAL_CONTENT, true, "f").is_ok());
        assert!(matches!(
            check_media_status(StatusCode::OK, true, "f"),
            Err(Error::Stream(_))
        ));
        assert!(check_media_status(StatusCode::OK, false, "f").is_ok());
        assert!(check_media_status(StatusCode::NOT_FOUND, true, "f")
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            check_media_status(StatusCode::FORBIDDEN, false, "f"),
            Err(Error::Stream(_))
        ));
    }

    #[test]
    fn test_settings_require_token_and_root() {
        let mut config = DriveConfig::default();
        assert!(matches!(
            DriveSettings::from_app_config(&config),
            Err(Error::DriveTokenMissing)
        ));
        config.access_token = Some("token".to_string());
        assert!(matches!(
            DriveSettings::from_app_config(&config),
            Err(Error::DriveRootMissing)
        ));
        config.root_folder = Some("root".to_string());
        assert!(DriveSettings::from_app_config(&config).is_ok());
    }
}

//! Storage (cloud drive) data models.

use serde::{Deserialize, Serialize};

/// Mime type the drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file or folder entry returned by the drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub modified_time: Option<String>,
    pub thumbnail_link: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl DriveEntry {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// First parent folder, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderPage {
    pub entries: Vec<DriveEntry>,
    pub next_page_token: Option<String>,
}

/// Inclusive byte span requested from the content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: u64,
    pub end: u64,
}

impl ByteSpan {
    /// Number of bytes covered by the span.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Bounds are inclusive, so a span is empty only when `end < start`.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Value for an outgoing `Range` header.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

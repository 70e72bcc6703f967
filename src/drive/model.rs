// Wire types shared by the operations and the Drive transport
use crate::drive::constants::FOLDER_MIME_TYPE;
use serde::{Deserialize, Serialize};

/// Metadata record of a file or folder stored in Drive.
///
/// Every field is optional: a caller-supplied field selection may leave any of them out
/// of the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
    /// Byte size, encoded by the service as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

impl FileDescriptor {
    /// A descriptor carrying nothing but an id, e.g. to reference a parent folder.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

/// One page of a files.list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Metadata body sent with files.create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

/// Partial update body sent with files.update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trashed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFileCall {
    pub metadata: FileMetadata,
    /// File content; `None` creates a metadata-only object such as a folder.
    pub media: Option<Vec<u8>>,
    pub fields: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFileCall {
    pub file_id: String,
    pub fields: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilesCall {
    pub q: Option<String>,
    pub spaces: Option<String>,
    pub fields: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFileCall {
    pub file_id: String,
    pub patch: FilePatch,
    pub fields: Option<String>,
}

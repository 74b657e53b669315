//! Wire shapes for the file-provider surface.
//!
//! Field names follow the host's camelCase wire format exactly; these types
//! exist so call wrappers validate and decode typed payloads while the
//! bridge core stays schema-agnostic.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Cloud storage provider integration type. Numeric on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CloudStorageProviderType {
    Sharepoint,
    WopiIntegration,
    Google,
}

impl From<CloudStorageProviderType> for u8 {
    fn from(provider_type: CloudStorageProviderType) -> Self {
        match provider_type {
            CloudStorageProviderType::Sharepoint => 0,
            CloudStorageProviderType::WopiIntegration => 1,
            CloudStorageProviderType::Google => 2,
        }
    }
}

impl TryFrom<u8> for CloudStorageProviderType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Sharepoint),
            1 => Ok(Self::WopiIntegration),
            2 => Ok(Self::Google),
            other => Err(format!("unknown cloud storage provider type: {other}")),
        }
    }
}

/// Cloud storage provider. Upper-case codes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudStorageProvider {
    #[serde(rename = "DROPBOX")]
    Dropbox,
    #[serde(rename = "BOX")]
    Box,
    #[serde(rename = "SHAREFILE")]
    Sharefile,
    #[serde(rename = "GOOGLEDRIVE")]
    GoogleDrive,
    #[serde(rename = "EGNYTE")]
    Egnyte,
}

/// A cloud storage folder the user has attached to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorageFolder {
    pub id: String,
    pub title: String,
    pub folder_id: String,
    pub provider_type: CloudStorageProviderType,
    pub provider_code: CloudStorageProvider,
    pub owner_display_name: String,
}

/// An entry inside a cloud storage folder: either a file or a
/// subdirectory, distinguished by `is_subdirectory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorageFolderItem {
    pub id: String,
    pub title: String,
    pub is_subdirectory: bool,
    /// File extension including the dot, empty for subdirectories.
    #[serde(rename = "type")]
    pub item_type: String,
    pub size: u64,
    pub object_url: String,
    pub last_modified_time: String,
}

/// Target of a folder-contents listing: the attached folder itself or a
/// subdirectory item inside it.
#[derive(Debug, Clone, Copy)]
pub enum ListTarget<'a> {
    Folder(&'a CloudStorageFolder),
    Item(&'a CloudStorageFolderItem),
}

/// Where the host should open a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOpenPreference {
    Inline,
    Desktop,
    Web,
}

/// Action the file viewer should start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerAction {
    View,
    Edit,
}

impl Display for ViewerAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::View => write!(formatter, "view"),
            Self::Edit => write!(formatter, "edit"),
        }
    }
}

/// Everything the host needs to render a file preview.
///
/// Serialized positionally, not as an object: `open_file_preview` flattens
/// these fields into a fixed 13-argument envelope, absent optionals
/// included as `null` to keep later positions stable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilePreviewParameters {
    pub entity_id: String,
    pub title: String,
    pub description: Option<String>,
    pub file_type: String,
    pub object_url: String,
    pub download_url: Option<String>,
    pub web_preview_url: Option<String>,
    pub web_edit_url: Option<String>,
    pub base_url: Option<String>,
    pub edit_file: bool,
    pub sub_entity_id: Option<String>,
    pub viewer_action: Option<ViewerAction>,
    pub file_open_preference: Option<FileOpenPreference>,
}

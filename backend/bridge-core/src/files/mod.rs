//! Call wrappers for the host's file-provider surface.
//!
//! Thin functions over [`Bridge`]: each one validates its own argument
//! shapes, declares the contexts it is allowed in as data, and packages a
//! positional argument list. No wrapper touches bridge internals, and the
//! bridge never interprets these payloads.

pub mod models;

pub use models::{
    CloudStorageFolder, CloudStorageFolderItem, CloudStorageProvider, CloudStorageProviderType,
    FileOpenPreference, FilePreviewParameters, ListTarget, ViewerAction,
};

use crate::bridge::Bridge;
use crate::error::files::FilesError;

use common::FrameContext;

use const_format::concatcp;
use serde_json::{Value, json};

const FILES_MODULE: &str = "files";

const GET_CLOUD_STORAGE_FOLDERS_FUNC: &str = concatcp!(FILES_MODULE, ".getCloudStorageFolders");
const ADD_CLOUD_STORAGE_FOLDER_FUNC: &str = concatcp!(FILES_MODULE, ".addCloudStorageFolder");
const DELETE_CLOUD_STORAGE_FOLDER_FUNC: &str =
    concatcp!(FILES_MODULE, ".deleteCloudStorageFolder");
const GET_CLOUD_STORAGE_FOLDER_CONTENTS_FUNC: &str =
    concatcp!(FILES_MODULE, ".getCloudStorageFolderContents");
const OPEN_CLOUD_STORAGE_FILE_FUNC: &str = concatcp!(FILES_MODULE, ".openCloudStorageFile");

/// Lives outside the `files` namespace for historical host-side reasons.
const OPEN_FILE_PREVIEW_FUNC: &str = "openFilePreview";

/// File-provider operations are only meaningful inside a content frame.
const CLOUD_STORAGE_CONTEXTS: &[FrameContext] = &[FrameContext::Content];

/// File-provider call wrappers over a shared [`Bridge`].
#[derive(Clone)]
pub struct FilesClient {
    bridge: Bridge,
}

impl FilesClient {
    pub fn new(bridge: Bridge) -> Self {
        Self { bridge }
    }

    /// List cloud storage folders attached to a channel.
    pub async fn get_cloud_storage_folders(
        &self,
        channel_id: &str,
    ) -> Result<Vec<CloudStorageFolder>, FilesError> {
        require_channel_id(channel_id)?;

        let call = self
            .bridge
            .call(
                GET_CLOUD_STORAGE_FOLDERS_FUNC,
                vec![json!(channel_id)],
                CLOUD_STORAGE_CONTEXTS,
            )
            .await?;

        let args = call.await?;
        check_error_slot(&args)?;
        decode_at(&args, 1)
    }

    /// Start the host's add-folder flow for a channel.
    ///
    /// Resolves with whether a folder was actually added plus the updated
    /// folder list.
    pub async fn add_cloud_storage_folder(
        &self,
        channel_id: &str,
    ) -> Result<(bool, Vec<CloudStorageFolder>), FilesError> {
        require_channel_id(channel_id)?;

        let call = self
            .bridge
            .call(
                ADD_CLOUD_STORAGE_FOLDER_FUNC,
                vec![json!(channel_id)],
                CLOUD_STORAGE_CONTEXTS,
            )
            .await?;

        let args = call.await?;
        check_error_slot(&args)?;

        let is_folder_added = decode_at(&args, 1)?;
        let folders = decode_at(&args, 2)?;
        Ok((is_folder_added, folders))
    }

    /// Detach a cloud storage folder from a channel.
    pub async fn delete_cloud_storage_folder(
        &self,
        channel_id: &str,
        folder_to_delete: &CloudStorageFolder,
    ) -> Result<bool, FilesError> {
        require_channel_id(channel_id)?;

        let call = self
            .bridge
            .call(
                DELETE_CLOUD_STORAGE_FOLDER_FUNC,
                vec![json!(channel_id), serde_json::to_value(folder_to_delete)?],
                CLOUD_STORAGE_CONTEXTS,
            )
            .await?;

        let args = call.await?;
        check_error_slot(&args)?;
        decode_at(&args, 1)
    }

    /// List the contents of an attached folder or of a subdirectory inside
    /// one. File items are rejected before the call is issued.
    pub async fn get_cloud_storage_folder_contents(
        &self,
        target: ListTarget<'_>,
        provider: CloudStorageProvider,
    ) -> Result<Vec<CloudStorageFolderItem>, FilesError> {
        let target_value = match target {
            ListTarget::Folder(folder) => serde_json::to_value(folder)?,
            ListTarget::Item(item) => {
                if !item.is_subdirectory {
                    return Err(FilesError::validation(
                        "folder contents can only be listed for subdirectories",
                    ));
                }
                serde_json::to_value(item)?
            }
        };

        let call = self
            .bridge
            .call(
                GET_CLOUD_STORAGE_FOLDER_CONTENTS_FUNC,
                vec![target_value, serde_json::to_value(provider)?],
                CLOUD_STORAGE_CONTEXTS,
            )
            .await?;

        let args = call.await?;
        check_error_slot(&args)?;
        decode_at(&args, 1)
    }

    /// Ask the host to open a file from cloud storage. Fire-and-forget:
    /// the host owns the UI from here, no response is expected.
    pub async fn open_cloud_storage_file(
        &self,
        file: &CloudStorageFolderItem,
        provider: CloudStorageProvider,
        open_preference: Option<FileOpenPreference>,
    ) -> Result<(), FilesError> {
        if file.is_subdirectory {
            return Err(FilesError::validation("subdirectories cannot be opened as files"));
        }

        self.bridge
            .notify(
                OPEN_CLOUD_STORAGE_FILE_FUNC,
                vec![
                    serde_json::to_value(file)?,
                    serde_json::to_value(provider)?,
                    json!(open_preference),
                ],
                CLOUD_STORAGE_CONTEXTS,
            )
            .await?;

        Ok(())
    }

    /// Ask the host to open a file preview. Fire-and-forget.
    ///
    /// The host dispatches on arg position, so all 13 fields are sent in
    /// fixed order with absent optionals as `null`.
    pub async fn open_file_preview(
        &self,
        parameters: &FilePreviewParameters,
    ) -> Result<(), FilesError> {
        let args = vec![
            json!(parameters.entity_id),
            json!(parameters.title),
            json!(parameters.description),
            json!(parameters.file_type),
            json!(parameters.object_url),
            json!(parameters.download_url),
            json!(parameters.web_preview_url),
            json!(parameters.web_edit_url),
            json!(parameters.base_url),
            json!(parameters.edit_file),
            json!(parameters.sub_entity_id),
            json!(parameters.viewer_action),
            json!(parameters.file_open_preference),
        ];

        self.bridge
            .notify(OPEN_FILE_PREVIEW_FUNC, args, CLOUD_STORAGE_CONTEXTS)
            .await?;

        Ok(())
    }
}

fn require_channel_id(channel_id: &str) -> Result<(), FilesError> {
    if channel_id.is_empty() {
        return Err(FilesError::validation("channel id must not be empty"));
    }
    Ok(())
}

/// Interpret the conventional error slot: the first response argument,
/// where anything falsy means success.
fn check_error_slot(args: &[Value]) -> Result<(), FilesError> {
    match args.first() {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(()),
        Some(Value::String(message)) => Err(FilesError::host(message.clone())),
        Some(other) => Err(FilesError::host(other.to_string())),
    }
}

/// Decode the positional result argument at `index`.
fn decode_at<T: serde::de::DeserializeOwned>(args: &[Value], index: usize) -> Result<T, FilesError> {
    let value = args.get(index).cloned().ok_or_else(|| {
        FilesError::response(format!("host response is missing argument {index}"))
    })?;

    Ok(serde_json::from_value(value)?)
}

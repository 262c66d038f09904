//! Backup destination abstraction
//!
//! A run creates one folder and uploads every song into it through the
//! [`BackupStore`] trait; [`DriveClient`] is the Google Drive implementation.

pub(crate) mod auth;
pub(crate) mod drive;
mod multipart;

use serde::Deserialize;

use crate::error::DriveError;

pub(crate) use auth::ServiceAccountKey;
pub(crate) use drive::DriveClient;

/// File or folder as reported by the storage service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct RemoteFile {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: String,
}

pub(crate) trait BackupStore {
    /// Create a folder named `name` inside `parent_id`
    fn create_folder(&mut self, name: &str, parent_id: &str) -> Result<RemoteFile, DriveError>;

    /// Upload `data` as a new file inside `folder_id`
    fn upload(
        &mut self,
        folder_id: &str,
        file_name: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<RemoteFile, DriveError>;
}

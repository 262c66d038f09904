use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use ureq::Body;
use ureq::http::Response;

use super::auth::{ServiceAccountKey, TokenProvider};
use super::multipart::related_body;
use super::{BackupStore, RemoteFile};
use crate::consts::DRIVE_FOLDER_MIME_TYPE;
use crate::error::DriveError;

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files?fields=id,name";
const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,name";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Google Drive v3 client authenticated as a service account
pub(crate) struct DriveClient {
    agent: ureq::Agent,
    tokens: TokenProvider,
}

impl DriveClient {
    pub(crate) fn new(key: ServiceAccountKey) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        let tokens = TokenProvider::new(key, agent.clone());
        Self { agent, tokens }
    }

    pub(crate) fn account(&self) -> &str {
        self.tokens.client_email()
    }
}

impl BackupStore for DriveClient {
    fn create_folder(&mut self, name: &str, parent_id: &str) -> Result<RemoteFile, DriveError> {
        let metadata = json!({
            "name": name,
            "mimeType": DRIVE_FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });
        let response = self
            .agent
            .post(FILES_URL)
            .header("Authorization", self.tokens.bearer()?)
            .send_json(metadata)?;
        read_json(response)
    }

    fn upload(
        &mut self,
        folder_id: &str,
        file_name: &str,
        data: Vec<u8>,
        mime_type: &str,
    ) -> Result<RemoteFile, DriveError> {
        let metadata = json!({ "name": file_name, "parents": [folder_id] });
        let body = related_body(&metadata, &data, mime_type);
        debug!(file_name, bytes = data.len(), "Uploading");

        let response = self
            .agent
            .post(UPLOAD_URL)
            .header("Authorization", self.tokens.bearer()?)
            .header("Content-Type", body.content_type())
            .send(&body.bytes[..])?;
        read_json(response)
    }
}

/// Decode a successful JSON response, or turn the error payload into `DriveError::Api`
pub(super) fn read_json<T: DeserializeOwned>(mut response: Response<Body>) -> Result<T, DriveError> {
    let status = response.status();
    if status.is_success() {
        return response
            .body_mut()
            .read_json()
            .map_err(|e| DriveError::Protocol(e.to_string()));
    }

    let text = response.body_mut().read_to_string().unwrap_or_default();
    Err(DriveError::Api {
        status: status.as_u16(),
        message: error_message(&text),
    })
}

/// Pull the human-readable message out of a Google error body
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let error = &value["error"];
    error["message"]
        .as_str()
        .or_else(|| value["error_description"].as_str())
        .or_else(|| error.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

//! Data models for Google Drive API responses.

use serde::{Deserialize, Serialize};

/// MIME type Google Drive reserves for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file or folder as returned by `files.list` / `files.get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub drive_id: Option<String>,
}

impl DriveEntry {
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

impl std::fmt::Display for DriveEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_folder() {
            "[folder]"
        } else {
            self.mime_type.as_deref().unwrap_or("-")
        };
        write!(f, "{}\t{}\t{}", self.id, kind, self.name)
    }
}

/// Shared Drive metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveContainer {
    pub id: String,
    pub name: String,
}

impl std::fmt::Display for DriveContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.id, self.name)
    }
}

/// Response from the files.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<DriveEntry>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Response from the drives.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveListResponse {
    #[serde(default)]
    pub drives: Vec<DriveContainer>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account key payload.
///
/// Every field is optional here; [`crate::auth::Authenticator`] decides
/// which ones are required when a session is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceAccountInfo {
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub account_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    /// Keys this crate does not read (`auth_uri`, cert URLs, ...), kept so
    /// the payload can be written back out unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServiceAccountInfo {
    /// The service account email, if the payload carries a non-empty one.
    pub fn client_email(&self) -> Option<&str> {
        self.client_email.as_deref().filter(|s| !s.is_empty())
    }
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

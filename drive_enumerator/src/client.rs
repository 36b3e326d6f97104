//! Google Drive API session for enumerating files, folders and shared drives.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::models::{
    ApiErrorResponse, DriveContainer, DriveEntry, DriveListResponse, FileListResponse,
    ServiceAccountInfo, FOLDER_MIME_TYPE,
};

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Page size requested by [`DriveSession::list_folders`].
pub const FOLDER_PAGE_SIZE: u32 = 100;

/// Page size requested by [`DriveSession::list_shared_drives`].
pub const SHARED_DRIVE_PAGE_SIZE: u32 = 50;

/// Root entries shown by the access check fallback.
const ROOT_PREVIEW_LEN: usize = 5;

/// Folder name marker used by the ingestion side to opt folders in.
pub const WATCHED_MARKER: &str = "--watched";

const ENTRY_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";

/// Where a paginated query looks for entries.
#[derive(Debug, Clone, Copy)]
pub enum QueryScope<'a> {
    /// Everything the identity can see, across all drives.
    AllDrives,
    /// A single shared drive.
    SharedDrive(&'a str),
}

/// Outcome of [`DriveSession::check_access`].
#[derive(Debug)]
pub enum AccessReport {
    /// The folder metadata could be read.
    Accessible(DriveEntry),
    /// The folder could not be read; results of the fallback listings.
    Inaccessible {
        error: DriveError,
        shared_drives: Result<Vec<DriveContainer>>,
        root_files: Result<Vec<DriveEntry>>,
    },
}

/// An authenticated Drive API session.
#[derive(Debug)]
pub struct DriveSession {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveSession {
    /// Create a session from an existing authenticator.
    pub fn new(auth: Authenticator) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    /// Build an authenticated session from a key payload and scopes.
    pub fn authenticate<S: AsRef<str>>(info: &ServiceAccountInfo, scopes: &[S]) -> Result<Self> {
        let auth = Authenticator::new(info, scopes)?;
        tracing::info!(client_email = %auth.client_email(), "authenticated service account");
        Ok(Self::new(auth))
    }

    /// Point the session at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn service_account_email(&self) -> &str {
        self.auth.client_email()
    }

    /// List entries visible to the identity with no filter.
    ///
    /// Only the first page is returned.
    pub async fn list_all(&self) -> Result<Vec<DriveEntry>> {
        let response: FileListResponse = self
            .get_json("files", &[("fields", ENTRY_FIELDS)])
            .await?;
        warn_if_truncated("files", response.next_page_token.as_deref());
        Ok(response.files)
    }

    /// List folders across all drives, up to [`FOLDER_PAGE_SIZE`] of them.
    pub async fn list_folders(&self) -> Result<Vec<DriveEntry>> {
        let query = format!("mimeType = '{}'", FOLDER_MIME_TYPE);
        let page_size = FOLDER_PAGE_SIZE.to_string();
        let response: FileListResponse = self
            .get_json(
                "files",
                &[
                    ("q", query.as_str()),
                    ("pageSize", page_size.as_str()),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("fields", ENTRY_FIELDS),
                ],
            )
            .await?;
        warn_if_truncated("folders", response.next_page_token.as_deref());

        Ok(response
            .files
            .into_iter()
            .filter(DriveEntry::is_folder)
            .collect())
    }

    /// List shared drives, up to [`SHARED_DRIVE_PAGE_SIZE`] of them.
    pub async fn list_shared_drives(&self) -> Result<Vec<DriveContainer>> {
        let page_size = SHARED_DRIVE_PAGE_SIZE.to_string();
        let response: DriveListResponse = self
            .get_json("drives", &[("pageSize", page_size.as_str())])
            .await?;
        warn_if_truncated("shared drives", response.next_page_token.as_deref());
        Ok(response.drives)
    }

    /// Entries whose parent is the identity's own root.
    pub async fn list_root_files(&self) -> Result<Vec<DriveEntry>> {
        let response: FileListResponse = self
            .get_json(
                "files",
                &[("q", "'root' in parents"), ("fields", ENTRY_FIELDS)],
            )
            .await?;
        Ok(response.files)
    }

    /// Get metadata (name, id, containing drive) for a single entry.
    pub async fn get_file(&self, file_id: &str) -> Result<DriveEntry> {
        self.get_json(
            &format!("files/{}", file_id),
            &[("fields", "name,id,driveId"), ("supportsAllDrives", "true")],
        )
        .await
    }

    /// Query entries using Drive query syntax, following every page.
    pub async fn query_files(
        &self,
        query: &str,
        fields: &str,
        scope: QueryScope<'_>,
    ) -> Result<Vec<DriveEntry>> {
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, &str)> = vec![
                ("q", query),
                ("fields", fields),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
            ];
            match scope {
                QueryScope::AllDrives => params.push(("corpora", "allDrives")),
                QueryScope::SharedDrive(drive_id) => {
                    params.push(("corpora", "drive"));
                    params.push(("driveId", drive_id));
                }
            }
            if let Some(ref token) = page_token {
                params.push(("pageToken", token.as_str()));
            }

            let list_response: FileListResponse = self.get_json("files", &params).await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_files)
    }

    /// Entries inside folders whose name contains [`WATCHED_MARKER`].
    pub async fn watched_files(&self, drive_id: &str) -> Result<Vec<DriveEntry>> {
        tracing::info!(drive_id, "listing watched folders");
        let folder_query = format!(
            "name contains '{}' and mimeType = '{}' and trashed = false",
            WATCHED_MARKER, FOLDER_MIME_TYPE
        );
        let folders = self
            .query_files(
                &folder_query,
                "nextPageToken, files(id, name)",
                QueryScope::SharedDrive(drive_id),
            )
            .await?;

        if folders.is_empty() {
            tracing::info!(drive_id, "no watched folders");
            return Ok(Vec::new());
        }

        let parents = folders
            .iter()
            .map(|f| format!("'{}' in parents", f.id))
            .collect::<Vec<_>>()
            .join(" or ");
        let files = self
            .query_files(
                &format!("({}) and trashed = false", parents),
                "nextPageToken, files(id, name, mimeType, modifiedTime)",
                QueryScope::SharedDrive(drive_id),
            )
            .await?;

        tracing::info!(
            drive_id,
            folders = folders.len(),
            files = files.len(),
            "found watched files"
        );
        Ok(files)
    }

    /// Check whether the identity can read `folder_id`.
    ///
    /// On failure, lists shared drives and a few root entries to show what
    /// the identity can see instead.
    pub async fn check_access(&self, folder_id: &str) -> AccessReport {
        match self.get_file(folder_id).await {
            Ok(entry) => AccessReport::Accessible(entry),
            Err(error) => {
                tracing::warn!(folder_id, %error, "folder not accessible, trying fallbacks");
                let shared_drives = self.list_shared_drives().await;
                let root_files = self.list_root_files().await.map(|mut files| {
                    files.truncate(ROOT_PREVIEW_LEN);
                    files
                });
                AccessReport::Inaccessible {
                    error,
                    shared_drives,
                    root_files,
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let token = self.auth.get_access_token().await?;
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "drive request");

        let request = self.http.get(url).bearer_auth(&token).query(params);
        let response = send(request).await?;
        Ok(response.json().await?)
    }
}

/// Send a request, turning non-2xx responses into [`DriveError::ApiError`].
async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

fn warn_if_truncated(what: &str, next_page_token: Option<&str>) {
    if next_page_token.is_some() {
        tracing::warn!("more {} available than the first page returned", what);
    }
}

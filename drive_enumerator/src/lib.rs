//! drive_enumerator - Enumerate Google Drive content as a service account.
//!
//! This library provides functionality to:
//! - Authenticate with a service account key and a set of OAuth scopes
//! - List files, folders and shared drives visible to that identity
//! - Check folder access and find files in `--watched` folders
//!
//! # Example
//!
//! ```no_run
//! use drive_enumerator::{auth::DRIVE_READONLY_SCOPE, DriveSession, ServiceAccountInfo};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let info = ServiceAccountInfo::from_file("service-account.json")?;
//!     let session = DriveSession::authenticate(&info, &[DRIVE_READONLY_SCOPE])?;
//!
//!     for folder in session.list_folders().await? {
//!         println!("{}", folder);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod url_parser;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::{AccessReport, DriveSession, QueryScope};
pub use error::{DriveError, ErrorKind, Result};
pub use models::{DriveContainer, DriveEntry, ServiceAccountInfo, FOLDER_MIME_TYPE};
pub use url_parser::extract_id;

//! drive_enumerator CLI - List what a service account can see in Google Drive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drive_enumerator::auth::{DRIVE_READONLY_SCOPE, DRIVE_SCOPE};
use drive_enumerator::{
    extract_id, AccessReport, Authenticator, DriveEntry, DriveSession, ServiceAccountInfo,
};

/// CLI tool for enumerating Google Drive content as a service account.
#[derive(Parser)]
#[command(name = "drive_enumerator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to service account JSON credentials file.
    /// Falls back to inline JSON in SERVICE_ACCOUNT_INFO when unset.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// OAuth scope to request (repeatable).
    #[arg(long = "scope", default_values_t = [DRIVE_SCOPE.to_string(), DRIVE_READONLY_SCOPE.to_string()])]
    scopes: Vec<String>,

    /// User to impersonate through domain-wide delegation.
    #[arg(long, env = "DRIVE_SUBJECT")]
    subject: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every entry visible to the service account (first page).
    List,

    /// List folders across all drives.
    Folders,

    /// List shared drives.
    Drives,

    /// List entries in the service account's root.
    Root,

    /// Check access to a folder.
    Check {
        /// Folder URL or ID.
        folder: String,
    },

    /// List files in `--watched` folders of a shared drive.
    Watched {
        /// Shared drive URL or ID.
        #[arg(long, env = "DRIVE_ID")]
        drive_id: String,
    },

    /// Print the credentials as a SERVICE_ACCOUNT_INFO line for a .env file.
    EnvLine,
}

fn load_credentials(path: Option<&PathBuf>) -> Result<ServiceAccountInfo> {
    match path {
        Some(path) => ServiceAccountInfo::from_file(path)
            .with_context(|| format!("Failed to load credentials from {:?}", path)),
        None => ServiceAccountInfo::from_env()
            .context("No --credentials given and SERVICE_ACCOUNT_INFO is not usable"),
    }
}

fn print_entries(entries: &[DriveEntry]) {
    if entries.is_empty() {
        println!("No files found.");
        return;
    }

    println!("Found {} item(s):", entries.len());
    for entry in entries {
        println!("{}", entry);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let info = load_credentials(cli.credentials.as_ref())?;

    let open_session = || -> Result<DriveSession> {
        let mut auth = Authenticator::new(&info, &cli.scopes).context("Invalid credentials")?;
        if let Some(subject) = &cli.subject {
            auth = auth.with_subject(subject.clone());
        }
        Ok(DriveSession::new(auth))
    };

    match cli.command {
        Commands::List => {
            let session = open_session()?;
            let entries = session.list_all().await.context("Failed to list files")?;
            print_entries(&entries);
        }

        Commands::Folders => {
            let session = open_session()?;
            let folders = session
                .list_folders()
                .await
                .context("Failed to list folders")?;
            print_entries(&folders);
        }

        Commands::Drives => {
            let session = open_session()?;
            let drives = session
                .list_shared_drives()
                .await
                .context("Failed to list shared drives")?;
            if drives.is_empty() {
                println!("No shared drives found.");
            } else {
                println!("Found {} shared drive(s):", drives.len());
                for drive in drives {
                    println!("{}", drive);
                }
            }
        }

        Commands::Root => {
            let session = open_session()?;
            let entries = session
                .list_root_files()
                .await
                .context("Failed to list root files")?;
            print_entries(&entries);
        }

        Commands::Check { folder } => {
            let session = open_session()?;
            let folder_id = extract_id(&folder)
                .with_context(|| format!("Invalid folder URL or ID: {}", folder))?;

            println!("Service account email: {}", session.service_account_email());
            println!("Testing access to folder {}...", folder_id);

            match session.check_access(&folder_id).await {
                AccessReport::Accessible(entry) => {
                    println!("Success! Found folder: {} (ID: {})", entry.name, entry.id);
                    if let Some(drive_id) = entry.drive_id {
                        println!("This folder is in a Shared Drive with ID: {}", drive_id);
                    }
                }
                AccessReport::Inaccessible {
                    error,
                    shared_drives,
                    root_files,
                } => {
                    println!("Error accessing folder: {}", error);
                    match shared_drives {
                        Ok(drives) => {
                            println!("Found {} Shared Drives:", drives.len());
                            for drive in drives {
                                println!("- {} (ID: {})", drive.name, drive.id);
                            }
                        }
                        Err(e) => println!("Error listing drives: {}", e),
                    }
                    match root_files {
                        Ok(files) => {
                            println!("First {} files in root:", files.len());
                            for file in files {
                                println!("- {} (ID: {})", file.name, file.id);
                            }
                        }
                        Err(e) => println!("Error listing root files: {}", e),
                    }
                }
            }
        }

        Commands::Watched { drive_id } => {
            let session = open_session()?;
            let drive_id = extract_id(&drive_id)
                .with_context(|| format!("Invalid shared drive URL or ID: {}", drive_id))?;
            let files = session
                .watched_files(&drive_id)
                .await
                .with_context(|| format!("Failed to list watched files in {}", drive_id))?;
            print_entries(&files);
        }

        Commands::EnvLine => {
            println!("Put this in your .env file:");
            println!("{}", info.to_env_line()?);
        }
    }

    Ok(())
}

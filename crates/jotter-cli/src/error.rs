use std::io;

use jotter_core::auth::AuthError;
use jotter_core::config::ConfigError;
use jotter_core::remote::RemoteError;
use jotter_core::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] jotter_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
    #[error("Configuration error: {0}")]
    Backend(#[from] ConfigError),
    #[error("Note title cannot be empty")]
    EmptyTitle,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Invalid note id: {0}")]
    InvalidNoteId(String),
    #[error("Note not found for id: {0}")]
    NoteNotFound(String),
    #[error("Image file is empty: {0}")]
    EmptyImage(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Sync is not configured. Run `jotter config init --supabase-url <URL> --supabase-anon-key <KEY>` or set SUPABASE_URL and SUPABASE_ANON_KEY."
    )]
    SyncNotConfigured,
}

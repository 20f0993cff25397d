//! Remote note storage.
//!
//! Every operation requires a signed-in user; implementations report a
//! missing session as [`RemoteError::Unauthenticated`].

mod memory;
mod profiles;
mod supabase;

use thiserror::Error;

use crate::models::{RemoteNote, RemoteNoteDraft, RemoteNoteUpdate, ServerId};

pub use memory::InMemoryRemoteStore;
pub use profiles::{SupabaseProfileClient, UserProfile};
pub use supabase::SupabaseNoteStore;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("not signed in")]
    Unauthenticated,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("rejected by server: {0}")]
    Validation(String),
    /// Missing and not-owned rows are indistinguishable
    #[error("note {0} not found on server")]
    NotFound(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        Self::Connection(error.to_string())
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Owner-scoped note table reachable over the network (async)
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Create a row and return the id the server assigned
    async fn insert(&self, draft: &RemoteNoteDraft) -> RemoteResult<ServerId>;

    /// Overwrite an existing row
    async fn update(&self, id: &ServerId, fields: &RemoteNoteUpdate) -> RemoteResult<()>;

    /// Rows owned by `owner_id`, most recently updated first
    async fn list_for_owner(&self, owner_id: &str) -> RemoteResult<Vec<RemoteNote>>;
}

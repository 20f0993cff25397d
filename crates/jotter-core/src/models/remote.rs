//! Remote note rows and the payloads sent to the remote store

use serde::{Deserialize, Serialize};

use super::note::{Note, ServerId};

/// A note row as listed by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNote {
    pub server_id: ServerId,
    pub title: String,
    pub content: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    pub owner_id: String,
}

/// Payload for creating a remote row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNoteDraft {
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub owner_id: String,
}

impl RemoteNoteDraft {
    pub fn from_note(note: &Note, owner_id: impl Into<String>) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            created_at: note.created_at,
            updated_at: note.updated_at,
            owner_id: owner_id.into(),
        }
    }
}

/// Fields overwritten on an existing remote row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNoteUpdate {
    pub title: String,
    pub content: String,
    pub updated_at: i64,
}

impl From<&Note> for RemoteNoteUpdate {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            updated_at: note.updated_at,
        }
    }
}

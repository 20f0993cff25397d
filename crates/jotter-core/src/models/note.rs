//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::remote::RemoteNote;
use crate::util::unix_millis_now;

/// Identifier assigned by the local store. Never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(i64);

impl LocalId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Opaque identifier assigned by the remote backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-note sync status, derived from `server_id` and `synced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Never pushed; no server counterpart
    LocalOnly,
    /// Matches the server copy as of the last push or pull
    Synced,
    /// Has a server counterpart but was edited locally since
    Dirty,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LocalOnly => "local-only",
            Self::Synced => "synced",
            Self::Dirty => "dirty",
        };
        f.write_str(label)
    }
}

/// A note as held by the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Local identifier
    pub local_id: LocalId,
    /// Server identifier, once the note exists remotely
    pub server_id: Option<ServerId>,
    pub title: String,
    pub content: String,
    /// Encoded illustration, carried opaquely
    pub image: Option<Vec<u8>>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Owner of the remote copy
    pub owner_id: Option<String>,
    pub synced: bool,
}

impl Note {
    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        match (&self.server_id, self.synced) {
            (None, _) => SyncStatus::LocalOnly,
            (Some(_), true) => SyncStatus::Synced,
            (Some(_), false) => SyncStatus::Dirty,
        }
    }
}

/// A note that has not been assigned a local id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub image: Option<Vec<u8>>,
    pub created_at: i64,
    pub updated_at: i64,
    pub server_id: Option<ServerId>,
    pub owner_id: Option<String>,
    pub synced: bool,
}

impl NewNote {
    /// A purely local note stamped with the current time
    pub fn local(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = unix_millis_now();
        Self {
            title: title.into(),
            content: content.into(),
            image: None,
            created_at: now,
            updated_at: now,
            server_id: None,
            owner_id: None,
            synced: false,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// A note materialized from a remote row, synced from birth
    #[must_use]
    pub fn from_remote(remote: &RemoteNote) -> Self {
        Self {
            title: remote.title.clone(),
            content: remote.content.clone(),
            image: None,
            created_at: remote.created_at,
            updated_at: remote.updated_at,
            server_id: Some(remote.server_id.clone()),
            owner_id: Some(remote.owner_id.clone()),
            synced: true,
        }
    }
}

/// Partial update applied by `LocalStore::update`.
///
/// Fields left as `None` keep their stored value. `image` uses a nested
/// option so an edit can clear the illustration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<Option<Vec<u8>>>,
    pub updated_at: Option<i64>,
    pub server_id: Option<ServerId>,
    pub owner_id: Option<String>,
    pub synced: Option<bool>,
}

impl NotePatch {
    /// A user edit: bumps `updated_at` and marks the note unsynced
    #[must_use]
    pub fn edit() -> Self {
        Self {
            updated_at: Some(unix_millis_now()),
            synced: Some(false),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn image(mut self, image: Option<Vec<u8>>) -> Self {
        self.image = Some(image);
        self
    }

    /// Record a successful push-insert
    #[must_use]
    pub fn pushed(server_id: ServerId, owner_id: impl Into<String>) -> Self {
        Self {
            server_id: Some(server_id),
            owner_id: Some(owner_id.into()),
            synced: Some(true),
            ..Self::default()
        }
    }

    /// Record a successful push-update
    #[must_use]
    pub fn marked_synced() -> Self {
        Self {
            synced: Some(true),
            ..Self::default()
        }
    }

    /// Blind overwrite from the server copy
    #[must_use]
    pub fn from_remote(remote: &RemoteNote) -> Self {
        Self {
            title: Some(remote.title.clone()),
            content: Some(remote.content.clone()),
            updated_at: Some(remote.updated_at),
            owner_id: Some(remote.owner_id.clone()),
            synced: Some(true),
            ..Self::default()
        }
    }

    /// Whether the patch touches user-visible content
    #[must_use]
    pub const fn is_content_edit(&self) -> bool {
        self.title.is_some() || self.content.is_some() || self.image.is_some()
    }

    /// Apply onto an existing note, producing the stored result
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            note.content.clone_from(content);
        }
        if let Some(image) = &self.image {
            note.image.clone_from(image);
        }
        if let Some(updated_at) = self.updated_at {
            note.updated_at = updated_at.max(note.created_at);
        }
        if let Some(server_id) = &self.server_id {
            note.server_id = Some(server_id.clone());
        }
        if let Some(owner_id) = &self.owner_id {
            note.owner_id = Some(owner_id.clone());
        }
        if let Some(synced) = self.synced {
            note.synced = synced;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stored_note() -> Note {
        Note {
            local_id: LocalId::new(1),
            server_id: None,
            title: "Groceries".to_string(),
            content: "milk\neggs".to_string(),
            image: None,
            created_at: 1_000,
            updated_at: 1_000,
            owner_id: None,
            synced: false,
        }
    }

    #[test]
    fn local_id_parses_and_displays() {
        let id: LocalId = " 42 ".parse().unwrap();
        assert_eq!(id, LocalId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<LocalId>().is_err());
    }

    #[test]
    fn new_local_note_is_unsynced_with_equal_timestamps() {
        let note = NewNote::local("Title", "");
        assert!(note.server_id.is_none());
        assert!(!note.synced);
        assert!(note.created_at > 0);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn sync_status_follows_server_id_and_flag() {
        let mut note = stored_note();
        assert_eq!(note.sync_status(), SyncStatus::LocalOnly);

        note.server_id = Some(ServerId::new("s1"));
        note.synced = true;
        assert_eq!(note.sync_status(), SyncStatus::Synced);

        note.synced = false;
        assert_eq!(note.sync_status(), SyncStatus::Dirty);
    }

    #[test]
    fn edit_patch_bumps_timestamp_and_clears_synced() {
        let mut note = stored_note();
        note.server_id = Some(ServerId::new("s1"));
        note.synced = true;

        NotePatch::edit().title("Errands").apply_to(&mut note);

        assert_eq!(note.title, "Errands");
        assert_eq!(note.content, "milk\neggs");
        assert!(note.updated_at >= note.created_at);
        assert_eq!(note.sync_status(), SyncStatus::Dirty);
    }

    #[test]
    fn patch_never_moves_updated_at_before_created_at() {
        let mut note = stored_note();
        let patch = NotePatch {
            updated_at: Some(10),
            ..NotePatch::default()
        };
        patch.apply_to(&mut note);
        assert_eq!(note.updated_at, note.created_at);
    }

    #[test]
    fn pushed_patch_keeps_content_and_sets_identity() {
        let mut note = stored_note();
        let before = note.clone();

        NotePatch::pushed(ServerId::new("srv-9"), "user-1").apply_to(&mut note);

        assert_eq!(note.server_id, Some(ServerId::new("srv-9")));
        assert_eq!(note.owner_id.as_deref(), Some("user-1"));
        assert!(note.synced);
        assert_eq!(note.local_id, before.local_id);
        assert_eq!(note.updated_at, before.updated_at);
    }

    #[test]
    fn image_patch_can_clear_illustration() {
        let mut note = stored_note();
        note.image = Some(vec![1, 2, 3]);

        let patch = NotePatch::edit().image(None);
        assert!(patch.is_content_edit());
        patch.apply_to(&mut note);
        assert!(note.image.is_none());
    }
}

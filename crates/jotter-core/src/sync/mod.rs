//! Manual push/pull reconciliation between the local and remote note stores.
//!
//! Push uploads every local note; pull refreshes the local store from the
//! server with the remote copy always winning. Neither direction deletes
//! anything, and a failure stops the run wherever it got to.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::db::LocalStore;
use crate::models::{NewNote, Note, NotePatch, RemoteNoteDraft, RemoteNoteUpdate, SyncStatus};
use crate::remote::{RemoteError, RemoteStore};
use crate::session::SessionContext;

/// Failure of a push or pull, tagged by cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("must be logged in to sync")]
    Unauthenticated,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("rejected by server: {0}")]
    Validation(String),
    #[error("note {0} not found on server")]
    NotFound(String),
    #[error("local store error: {0}")]
    LocalWrite(String),
}

impl From<RemoteError> for SyncError {
    fn from(error: RemoteError) -> Self {
        match error {
            RemoteError::Unauthenticated => Self::Unauthenticated,
            RemoteError::Connection(message) => Self::Connection(message),
            RemoteError::Validation(message) => Self::Validation(message),
            RemoteError::NotFound(id) => Self::NotFound(id),
        }
    }
}

impl From<crate::Error> for SyncError {
    fn from(error: crate::Error) -> Self {
        Self::LocalWrite(error.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    Push,
    Pull,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Pull => write!(f, "pull"),
        }
    }
}

/// What a successful push or pull did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub direction: SyncDirection,
    /// Remote rows created by push
    pub inserted: usize,
    /// Remote rows overwritten by push
    pub updated: usize,
    /// Local notes materialized by pull
    pub created_locally: usize,
    /// Local notes overwritten by pull
    pub overwritten: usize,
}

impl SyncSummary {
    const fn new(direction: SyncDirection) -> Self {
        Self {
            direction,
            inserted: 0,
            updated: 0,
            created_locally: 0,
            overwritten: 0,
        }
    }

    /// Number of notes the run touched
    pub const fn total(&self) -> usize {
        self.inserted + self.updated + self.created_locally + self.overwritten
    }

    /// User-facing one-liner
    pub const fn message(&self) -> &'static str {
        match self.direction {
            SyncDirection::Push => "All notes pushed to server successfully",
            SyncDirection::Pull if self.total() == 0 => "No notes found on server",
            SyncDirection::Pull => "Notes pulled from server successfully",
        }
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SyncDirection::Push => write!(
                f,
                "{} ({} inserted, {} updated)",
                self.message(),
                self.inserted,
                self.updated
            ),
            SyncDirection::Pull => write!(
                f,
                "{} ({} new, {} overwritten)",
                self.message(),
                self.created_locally,
                self.overwritten
            ),
        }
    }
}

/// Per-status tally of the local store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub local_only: usize,
    pub synced: usize,
    pub dirty: usize,
}

impl StatusCounts {
    pub fn tally<'a>(notes: impl IntoIterator<Item = &'a Note>) -> Self {
        notes
            .into_iter()
            .fold(Self::default(), |mut counts, note| {
                match note.sync_status() {
                    SyncStatus::LocalOnly => counts.local_only += 1,
                    SyncStatus::Synced => counts.synced += 1,
                    SyncStatus::Dirty => counts.dirty += 1,
                }
                counts
            })
    }

    /// Notes a push would send
    pub const fn pending(&self) -> usize {
        self.local_only + self.dirty
    }
}

/// Reconciles a local store with a remote store on behalf of the
/// signed-in user.
pub struct SyncEngine<L, R, S> {
    local: L,
    remote: R,
    session: S,
}

impl<L, R, S> SyncEngine<L, R, S>
where
    L: LocalStore,
    R: RemoteStore,
    S: SessionContext,
{
    pub const fn new(local: L, remote: R, session: S) -> Self {
        Self {
            local,
            remote,
            session,
        }
    }

    pub const fn local(&self) -> &L {
        &self.local
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Upload every local note: update rows that already exist on the
    /// server, insert the rest and record their new server ids locally.
    pub async fn push(&self) -> SyncResult<SyncSummary> {
        let result = self.push_inner().await;
        log_outcome(SyncDirection::Push, &result);
        result
    }

    /// Refresh the local store from the server. Remote rows overwrite
    /// their local counterparts; unknown rows become new local notes.
    pub async fn pull(&self) -> SyncResult<SyncSummary> {
        let result = self.pull_inner().await;
        log_outcome(SyncDirection::Pull, &result);
        result
    }

    /// Sync status of every local note
    pub async fn status(&self) -> SyncResult<StatusCounts> {
        let notes = self.local.list_all().await?;
        Ok(StatusCounts::tally(&notes))
    }

    fn require_user(&self) -> SyncResult<String> {
        self.session
            .current_user_id()
            .ok_or(SyncError::Unauthenticated)
    }

    async fn push_inner(&self) -> SyncResult<SyncSummary> {
        let user_id = self.require_user()?;
        let notes = self.local.list_all().await?;
        tracing::info!("Pushing {} local notes", notes.len());

        let mut summary = SyncSummary::new(SyncDirection::Push);
        for note in &notes {
            match &note.server_id {
                Some(server_id) => {
                    tracing::debug!("Updating remote note {} from {}", server_id, note.local_id);
                    self.remote
                        .update(server_id, &RemoteNoteUpdate::from(note))
                        .await?;
                    if !note.synced {
                        self.local
                            .update(note.local_id, &NotePatch::marked_synced())
                            .await?;
                    }
                    summary.updated += 1;
                }
                None => {
                    let draft = RemoteNoteDraft::from_note(note, user_id.as_str());
                    let server_id = self.remote.insert(&draft).await?;
                    tracing::debug!("Inserted note {} as remote {}", note.local_id, server_id);
                    self.local
                        .update(
                            note.local_id,
                            &NotePatch::pushed(server_id, user_id.as_str()),
                        )
                        .await?;
                    summary.inserted += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn pull_inner(&self) -> SyncResult<SyncSummary> {
        let user_id = self.require_user()?;
        let remote_notes = self.remote.list_for_owner(&user_id).await?;
        tracing::info!("Pulled {} remote notes", remote_notes.len());

        let mut by_server_id = self
            .local
            .list_all()
            .await?
            .into_iter()
            .filter_map(|note| Some((note.server_id?, note.local_id)))
            .collect::<HashMap<_, _>>();

        let mut summary = SyncSummary::new(SyncDirection::Pull);
        for remote in &remote_notes {
            if let Some(&local_id) = by_server_id.get(&remote.server_id) {
                tracing::debug!("Overwriting note {} from remote {}", local_id, remote.server_id);
                self.local
                    .update(local_id, &NotePatch::from_remote(remote))
                    .await?;
                summary.overwritten += 1;
            } else {
                let local_id = self.local.create(&NewNote::from_remote(remote)).await?;
                tracing::debug!("Created note {} from remote {}", local_id, remote.server_id);
                by_server_id.insert(remote.server_id.clone(), local_id);
                summary.created_locally += 1;
            }
        }

        Ok(summary)
    }
}

fn log_outcome(direction: SyncDirection, result: &SyncResult<SyncSummary>) {
    match result {
        Ok(summary) => tracing::info!("Sync {} finished: {}", direction, summary),
        Err(error) => tracing::warn!("Sync {} aborted: {}", direction, error),
    }
}

//! In-process `RemoteStore` used by tests and offline demos.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::models::{RemoteNote, RemoteNoteDraft, RemoteNoteUpdate, ServerId};
use crate::session::{SessionContext, SharedSession};

#[derive(Debug, Default)]
struct State {
    rows: Vec<RemoteNote>,
    failures: VecDeque<RemoteError>,
    inserts: usize,
    updates: usize,
}

/// Remote table kept in memory.
///
/// Mirrors the server's row-level security: callers only see and modify
/// rows whose owner matches the signed-in user. Clones share state.
#[derive(Debug, Clone)]
pub struct InMemoryRemoteStore {
    session: SharedSession,
    state: Arc<Mutex<State>>,
}

impl InMemoryRemoteStore {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            state: Arc::default(),
        }
    }

    /// Make the next remote call fail with `error`. Queued failures are
    /// consumed in order, one per call.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().failures.push_back(error);
    }

    /// Insert a row directly, bypassing authentication. Returns its id.
    pub fn seed(&self, draft: &RemoteNoteDraft) -> ServerId {
        let id = ServerId::new(Uuid::now_v7().to_string());
        self.insert_row(RemoteNote {
            server_id: id.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: draft.created_at,
            updated_at: draft.updated_at,
            owner_id: draft.owner_id.clone(),
        });
        id
    }

    /// Store a fully-formed row as-is, including its id
    pub fn insert_row(&self, row: RemoteNote) {
        self.lock().rows.push(row);
    }

    /// Change a row in place, as another device would.
    pub fn edit_row(&self, id: &ServerId, edit: impl FnOnce(&mut RemoteNote)) -> bool {
        let mut state = self.lock();
        match state.rows.iter_mut().find(|row| &row.server_id == id) {
            Some(row) => {
                edit(row);
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> Vec<RemoteNote> {
        self.lock().rows.clone()
    }

    pub fn row(&self, id: &ServerId) -> Option<RemoteNote> {
        self.lock()
            .rows
            .iter()
            .find(|row| &row.server_id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `insert` calls
    pub fn insert_count(&self) -> usize {
        self.lock().inserts
    }

    /// Number of successful `update` calls
    pub fn update_count(&self) -> usize {
        self.lock().updates
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared preamble of every call: injected failure first, then auth.
    fn begin(&self) -> RemoteResult<(String, MutexGuard<'_, State>)> {
        let mut state = self.lock();
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        let user_id = self
            .session
            .current_user_id()
            .ok_or(RemoteError::Unauthenticated)?;
        Ok((user_id, state))
    }
}

impl RemoteStore for InMemoryRemoteStore {
    async fn insert(&self, draft: &RemoteNoteDraft) -> RemoteResult<ServerId> {
        let (user_id, mut state) = self.begin()?;
        if draft.owner_id != user_id {
            return Err(RemoteError::Validation(
                "row owner must match the signed-in user".to_string(),
            ));
        }
        if draft.title.trim().is_empty() {
            return Err(RemoteError::Validation("title must not be empty".to_string()));
        }

        let id = ServerId::new(Uuid::now_v7().to_string());
        state.rows.push(RemoteNote {
            server_id: id.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
            created_at: draft.created_at,
            updated_at: draft.updated_at,
            owner_id: draft.owner_id.clone(),
        });
        state.inserts += 1;
        Ok(id)
    }

    async fn update(&self, id: &ServerId, fields: &RemoteNoteUpdate) -> RemoteResult<()> {
        let (user_id, mut state) = self.begin()?;
        let row = state
            .rows
            .iter_mut()
            .find(|row| &row.server_id == id && row.owner_id == user_id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;

        row.title.clone_from(&fields.title);
        row.content.clone_from(&fields.content);
        row.updated_at = fields.updated_at;
        state.updates += 1;
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: &str) -> RemoteResult<Vec<RemoteNote>> {
        let (user_id, state) = self.begin()?;
        if owner_id != user_id {
            return Ok(Vec::new());
        }

        let mut rows = state
            .rows
            .iter()
            .filter(|row| row.owner_id == owner_id)
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }
}

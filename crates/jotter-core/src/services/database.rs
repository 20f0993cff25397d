//! Shared database service wrapper used across clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{Database, LibSqlNoteStore, LocalStore};
use crate::models::{LocalId, NewNote, Note, NotePatch};
use crate::Result;

/// Thread-safe service for DB and local store operations.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::debug!("Opening local note store at {}", db_path.display());
        let db = Database::open(&db_path).await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem path backing this service, if any.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

impl LocalStore for DatabaseService {
    async fn create(&self, note: &NewNote) -> Result<LocalId> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).create(note).await
    }

    async fn get(&self, id: LocalId) -> Result<Option<Note>> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).get(id).await
    }

    async fn update(&self, id: LocalId, patch: &NotePatch) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).update(id, patch).await
    }

    async fn delete(&self, id: LocalId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).delete(id).await
    }

    async fn list_all(&self) -> Result<Vec<Note>> {
        let db = self.db.lock().await;
        LibSqlNoteStore::new(db.connection()).list_all().await
    }
}

//! Local note store implementation

use crate::error::{Error, Result};
use crate::models::{LocalId, NewNote, Note, NotePatch, ServerId};
use libsql::{params, Connection};

const NOTE_COLUMNS: &str =
    "id, server_id, title, content, image, created_at, updated_at, owner_id, synced";

/// Trait for local note storage operations (async)
#[allow(async_fn_in_trait)]
pub trait LocalStore {
    /// Insert a note and return the id the store assigned to it
    async fn create(&self, note: &NewNote) -> Result<LocalId>;

    /// Get a note by id
    async fn get(&self, id: LocalId) -> Result<Option<Note>>;

    /// Apply a partial update; fails with `NotFound` for an absent id
    async fn update(&self, id: LocalId, patch: &NotePatch) -> Result<()>;

    /// Delete a note; fails with `NotFound` for an absent id
    async fn delete(&self, id: LocalId) -> Result<()>;

    /// All notes, most recently updated first
    async fn list_all(&self) -> Result<Vec<Note>>;
}

/// libSQL implementation of `LocalStore`
pub struct LibSqlNoteStore<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlNoteStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a note from a database row
    fn parse_note(row: &libsql::Row) -> Result<Note> {
        Ok(Note {
            local_id: LocalId::new(row.get(0)?),
            server_id: row
                .get::<Option<String>>(1)?
                .filter(|id| !id.trim().is_empty())
                .map(ServerId::new),
            title: row.get(2)?,
            content: row.get(3)?,
            image: row.get::<Option<Vec<u8>>>(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            owner_id: row.get::<Option<String>>(7)?,
            synced: row.get::<i32>(8)? != 0,
        })
    }
}

fn has_server_id(server_id: Option<&ServerId>) -> bool {
    server_id.is_some_and(|id| !id.is_empty())
}

fn check_sync_invariant(note: &Note) -> Result<()> {
    if note.synced && !has_server_id(note.server_id.as_ref()) {
        return Err(Error::InvalidInput(format!(
            "note {} cannot be marked synced without a server id",
            note.local_id
        )));
    }
    Ok(())
}

impl LocalStore for LibSqlNoteStore<'_> {
    async fn create(&self, note: &NewNote) -> Result<LocalId> {
        if note.synced && !has_server_id(note.server_id.as_ref()) {
            return Err(Error::InvalidInput(
                "a synced note requires a server id".into(),
            ));
        }

        let mut rows = self
            .conn
            .query(
                "INSERT INTO notes (server_id, title, content, image, created_at, updated_at, owner_id, synced)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 RETURNING id",
                params![
                    note.server_id.as_ref().map(ServerId::as_str),
                    note.title.as_str(),
                    note.content.as_str(),
                    note.image.clone(),
                    note.created_at,
                    note.updated_at.max(note.created_at),
                    note.owner_id.as_deref(),
                    i32::from(note.synced)
                ],
            )
            .await?;

        let row = rows
            .next()
            .await?
            .ok_or_else(|| Error::Database("insert did not return an id".into()))?;
        let id = LocalId::new(row.get(0)?);
        tracing::debug!("Created local note {}", id);
        Ok(id)
    }

    async fn get(&self, id: LocalId) -> Result<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?");
        let mut rows = self.conn.query(&sql, params![id.get()]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_note(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: LocalId, patch: &NotePatch) -> Result<()> {
        let mut note = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        patch.apply_to(&mut note);
        check_sync_invariant(&note)?;

        let rows = self
            .conn
            .execute(
                "UPDATE notes
                 SET server_id = ?, title = ?, content = ?, image = ?, updated_at = ?, owner_id = ?, synced = ?
                 WHERE id = ?",
                params![
                    note.server_id.as_ref().map(ServerId::as_str),
                    note.title.as_str(),
                    note.content.as_str(),
                    note.image.clone(),
                    note.updated_at,
                    note.owner_id.as_deref(),
                    i32::from(note.synced),
                    id.get()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: LocalId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?", params![id.get()])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY updated_at DESC, id DESC");
        let mut rows = self.conn.query(&sql, ()).await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::parse_note(&row)?);
        }
        Ok(notes)
    }
}

//! Data models for Jotter

mod note;
mod remote;

pub use note::{LocalId, NewNote, Note, NotePatch, ServerId, SyncStatus};
pub use remote::{RemoteNote, RemoteNoteDraft, RemoteNoteUpdate};

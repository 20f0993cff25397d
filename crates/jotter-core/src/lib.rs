//! jotter-core - Core library for Jotter
//!
//! This crate contains the note models, the libSQL-backed local store, the
//! remote stores, and the sync engine that reconciles them. Every Jotter
//! interface (currently the CLI) builds on it.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod services;
pub mod session;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{LocalId, Note, ServerId, SyncStatus};
pub use session::{SessionContext, SharedSession};
pub use sync::{SyncEngine, SyncError, SyncSummary};

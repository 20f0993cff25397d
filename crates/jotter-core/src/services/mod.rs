//! Shared services used by client apps

mod database;

pub use database::DatabaseService;

use std::path::Path;

use jotter_core::db::LocalStore;

use crate::commands::common::{open_database, resolve_note};
use crate::error::CliError;

pub async fn run_delete(id: &str, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let note = resolve_note(id, &db).await?;

    db.delete(note.local_id).await?;
    println!("{}", note.local_id);
    if note.server_id.is_some() {
        eprintln!("Deleted locally only; the server copy is kept and returns on the next pull.");
    }
    Ok(())
}

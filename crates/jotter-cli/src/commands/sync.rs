use std::path::Path;

use jotter_core::db::LocalStore;
use jotter_core::remote::SupabaseNoteStore;
use jotter_core::sync::{StatusCounts, SyncDirection};
use jotter_core::SyncEngine;

use crate::auth::SupabaseAuthService;
use crate::cli::SyncCommands;
use crate::commands::common::open_database;
use crate::config_profiles::{resolve_backend_config, CliProfilesConfig};
use crate::error::CliError;

pub async fn run_sync(
    command: SyncCommands,
    global_profile: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    match command {
        SyncCommands::Push => run_transfer(SyncDirection::Push, global_profile, db_path).await,
        SyncCommands::Pull => run_transfer(SyncDirection::Pull, global_profile, db_path).await,
        SyncCommands::Status { json } => run_status(json, db_path).await,
    }
}

async fn run_transfer(
    direction: SyncDirection,
    global_profile: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let backend = resolve_backend_config(config.profile(&profile_name))?
        .ok_or(CliError::SyncNotConfigured)?;

    let session = SupabaseAuthService::new(&profile_name, &backend)?
        .shared_session()
        .await?;
    let remote = SupabaseNoteStore::new(&backend, session.clone())?;
    let db = open_database(db_path).await?;
    tracing::debug!("Syncing profile '{}' against {}", profile_name, backend.supabase_url);

    let engine = SyncEngine::new(db, remote, session);
    let summary = match direction {
        SyncDirection::Push => engine.push().await?,
        SyncDirection::Pull => engine.pull().await?,
    };

    println!("{summary}");
    Ok(())
}

async fn run_status(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let counts = StatusCounts::tally(&db.list_all().await?);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        for line in format_status_lines(&counts) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_status_lines(counts: &StatusCounts) -> Vec<String> {
    let mut lines = vec![
        format!("local-only  {}", counts.local_only),
        format!("synced      {}", counts.synced),
        format!("dirty       {}", counts.dirty),
    ];
    if counts.pending() > 0 {
        lines.push(format!(
            "{} note(s) waiting for `jotter sync push`",
            counts.pending()
        ));
    }
    lines
}

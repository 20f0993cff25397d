//! Jotter CLI - local-first notes with manual Supabase sync
//!
//! Notes live in a local libSQL database; `jotter sync push|pull` moves them
//! to and from the Supabase project configured in the active profile.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::resolve_db_path;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, ImageChange};
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Add {
            title,
            content,
            edit,
            image,
        } => {
            run_add(
                &title,
                &content,
                edit,
                image.as_deref(),
                &resolve_db_path(cli.db_path)?,
            )
            .await
        }
        Commands::List { limit, json } => run_list(limit, json, &resolve_db_path(cli.db_path)?).await,
        Commands::Show { id, json } => run_show(&id, json, &resolve_db_path(cli.db_path)?).await,
        Commands::Edit {
            id,
            title,
            content,
            image,
            clear_image,
        } => {
            let image = match (image, clear_image) {
                (Some(path), _) => Some(ImageChange::Replace(path)),
                (None, true) => Some(ImageChange::Clear),
                (None, false) => None,
            };
            run_edit(
                &id,
                title.as_deref(),
                content.as_deref(),
                image,
                &resolve_db_path(cli.db_path)?,
            )
            .await
        }
        Commands::Delete { id } => run_delete(&id, &resolve_db_path(cli.db_path)?).await,
        Commands::Sync { command } => {
            run_sync(command, profile, &resolve_db_path(cli.db_path)?).await
        }
        Commands::Config { command } => run_config(command, profile),
        Commands::Auth { command } => run_auth(command, profile).await,
    }
}

/// Log to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::from_default_env();
    let filter = match "jotter=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

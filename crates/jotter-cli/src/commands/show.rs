use std::path::Path;

use jotter_core::Note;

use crate::commands::common::{format_timestamp, note_to_list_item, open_database, resolve_note};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let note = resolve_note(id, &db).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note_to_list_item(&note))?);
    } else {
        for line in render_note(&note) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn render_note(note: &Note) -> Vec<String> {
    let mut lines = vec![
        format!("# {}", note.title),
        format!("id:      {}", note.local_id),
        format!("status:  {}", note.sync_status()),
    ];
    if let Some(server_id) = &note.server_id {
        lines.push(format!("server:  {server_id}"));
    }
    lines.push(format!("created: {}", format_timestamp(note.created_at)));
    lines.push(format!("updated: {}", format_timestamp(note.updated_at)));
    if let Some(image) = &note.image {
        lines.push(format!("image:   {} bytes", image.len()));
    }
    if !note.content.is_empty() {
        lines.push(String::new());
        lines.extend(note.content.lines().map(str::to_string));
    }
    lines
}

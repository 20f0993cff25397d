use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use jotter_core::db::LocalStore;
use jotter_core::services::DatabaseService;
use jotter_core::{LocalId, Note};
use serde::Serialize;

use crate::error::CliError;

pub const DB_PATH_ENV: &str = "JOTTER_DB_PATH";

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub server_id: Option<String>,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
}

pub async fn list_notes(limit: usize, db: &DatabaseService) -> Result<Vec<Note>, CliError> {
    let mut notes = db.list_all().await?;
    notes.truncate(limit);
    Ok(notes)
}

pub fn parse_note_id(id: &str) -> Result<LocalId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyNoteId);
    }
    trimmed
        .parse::<LocalId>()
        .map_err(|_| CliError::InvalidNoteId(trimmed.to_string()))
}

pub async fn resolve_note(id: &str, db: &DatabaseService) -> Result<Note, CliError> {
    let local_id = parse_note_id(id)?;
    db.get(local_id)
        .await?
        .ok_or_else(|| CliError::NoteNotFound(local_id.to_string()))
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    notes
        .iter()
        .map(|note| {
            let title = truncate_chars(&collapse_whitespace(&note.title), 30);
            let relative_time = format_relative_time(note.updated_at, now_ms);
            format!(
                "{:>5}  {:<10}  {title:<30}  {relative_time}",
                note.local_id.to_string(),
                note.sync_status().to_string(),
            )
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();

    NoteListItem {
        id: note.local_id.get(),
        server_id: note.server_id.as_ref().map(ToString::to_string),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        status: note.sync_status().to_string(),
        created_at: note.created_at,
        updated_at: note.updated_at,
        relative_time: format_relative_time(note.updated_at, now_ms),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("");
    truncate_chars(&collapse_whitespace(first_line), max_chars)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = value.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn normalize_title(title: &str) -> Result<String, CliError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyTitle)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Content from arguments, then piped stdin, then `$EDITOR` when asked.
/// Empty content is allowed.
pub fn resolve_note_content(content_parts: &[String], use_editor: bool) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if use_editor {
        return Ok(capture_editor_input_with_initial("")?.unwrap_or_default());
    }

    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw bytes of an image file to attach to a note
pub fn read_image(path: &Path) -> Result<Vec<u8>, CliError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(CliError::EmptyImage(path.display().to_string()));
    }
    Ok(bytes)
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let status = match Command::new(editor).arg(file_path).status() {
        Ok(status) => status,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // EDITOR may carry arguments, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };
            Command::new(program).args(parts).arg(file_path).status()?
        }
        Err(err) => return Err(CliError::Io(err)),
    };

    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("jotter-note-{}-{now}.md", std::process::id()))
}

/// `--db-path`, then `JOTTER_DB_PATH`, then the platform data directory.
pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from)) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("jotter").join("jotter.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub async fn open_database(path: &Path) -> Result<DatabaseService, CliError> {
    Ok(DatabaseService::open_path(path).await?)
}

use std::path::{Path, PathBuf};

use jotter_core::db::LocalStore;
use jotter_core::models::NotePatch;

use crate::commands::common::{
    capture_editor_input_with_initial, normalize_title, open_database, read_image, resolve_note,
};
use crate::error::CliError;

/// Requested change to a note's attached image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
    Replace(PathBuf),
    Clear,
}

pub async fn run_edit(
    id: &str,
    title: Option<&str>,
    content: Option<&str>,
    image: Option<ImageChange>,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path).await?;
    let note = resolve_note(id, &db).await?;

    let title = title.map(normalize_title).transpose()?;
    let image = match image {
        Some(ImageChange::Replace(path)) => Some(Some(read_image(&path)?)),
        Some(ImageChange::Clear) => Some(None),
        None => None,
    };
    let content = match content {
        Some(content) => Some(content.trim().to_string()),
        None if title.is_none() && image.is_none() => {
            Some(capture_editor_input_with_initial(&note.content)?.unwrap_or_default())
        }
        None => None,
    };

    let patch = build_edit_patch(
        EditedFields {
            title: &note.title,
            content: &note.content,
            image: note.image.as_deref(),
        },
        title,
        content,
        image,
    );
    if let Some(patch) = patch {
        db.update(note.local_id, &patch).await?;
    }

    println!("{}", note.local_id);
    Ok(())
}

/// Current values of the fields an edit can change
#[derive(Debug, Clone, Copy)]
pub struct EditedFields<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub image: Option<&'a [u8]>,
}

/// Edit patch for the fields that actually changed, `None` when nothing did
pub fn build_edit_patch(
    current: EditedFields<'_>,
    title: Option<String>,
    content: Option<String>,
    image: Option<Option<Vec<u8>>>,
) -> Option<NotePatch> {
    let mut patch = NotePatch::edit();
    if let Some(title) = title.filter(|title| title != current.title) {
        patch = patch.title(title);
    }
    if let Some(content) = content.filter(|content| content != current.content) {
        patch = patch.content(content);
    }
    if let Some(image) = image.filter(|image| image.as_deref() != current.image) {
        patch = patch.image(image);
    }
    patch.is_content_edit().then_some(patch)
}

use std::path::Path;

use jotter_core::db::LocalStore;
use jotter_core::models::NewNote;

use crate::commands::common::{normalize_title, open_database, read_image, resolve_note_content};
use crate::error::CliError;

pub async fn run_add(
    title: &str,
    content_parts: &[String],
    use_editor: bool,
    image_path: Option<&Path>,
    db_path: &Path,
) -> Result<(), CliError> {
    let title = normalize_title(title)?;
    let image = image_path.map(read_image).transpose()?;
    let content = resolve_note_content(content_parts, use_editor)?;

    let mut note = NewNote::local(title, content);
    if let Some(image) = image {
        note = note.with_image(image);
    }

    let db = open_database(db_path).await?;
    let id = db.create(&note).await?;

    println!("{id}");
    Ok(())
}

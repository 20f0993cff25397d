use std::path::PathBuf;

use jotter_core::db::LocalStore;
use jotter_core::models::{NewNote, NotePatch};
use jotter_core::remote::UserProfile;
use jotter_core::services::DatabaseService;
use jotter_core::sync::StatusCounts;
use jotter_core::{LocalId, ServerId, SyncStatus};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::commands::add::run_add;
use crate::commands::common::{
    default_editor, format_relative_time, format_timestamp, list_notes, normalize_content,
    normalize_title, note_preview, note_to_list_item, parse_note_id, resolve_note,
};
use crate::commands::config::{init_profile, ProfileInput};
use crate::commands::delete::run_delete;
use crate::commands::auth_cmd::format_profile_lines;
use crate::commands::edit::{build_edit_patch, run_edit, EditedFields, ImageChange};
use crate::commands::show::render_note;
use crate::commands::sync::format_status_lines;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

fn test_db_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jotter.db");
    (dir, path)
}

fn note_at(title: &str, content: &str, updated_at: i64) -> NewNote {
    NewNote {
        created_at: 1_000,
        updated_at,
        ..NewNote::local(title, content)
    }
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn normalize_title_rejects_blank() {
    assert!(matches!(normalize_title("   "), Err(CliError::EmptyTitle)));
    assert_eq!(normalize_title("  Groceries ").unwrap(), "Groceries");
}

#[test]
fn parse_note_id_validates_input() {
    assert!(matches!(parse_note_id(" \n "), Err(CliError::EmptyNoteId)));
    assert!(matches!(
        parse_note_id("abc"),
        Err(CliError::InvalidNoteId(value)) if value == "abc"
    ));
    assert_eq!(parse_note_id(" 42 ").unwrap(), LocalId::new(42));
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
}

#[test]
fn format_timestamp_returns_utc_label() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[tokio::test(flavor = "multi_thread")]
async fn note_preview_uses_first_line_and_truncates() {
    let db = DatabaseService::open_in_memory().await.unwrap();
    let id = db
        .create(&NewNote::local(
            "t",
            "This is a very long sentence that should be shortened\nsecond line",
        ))
        .await
        .unwrap();
    let note = db.get(id).await.unwrap().unwrap();

    assert_eq!(note_preview(&note, 20), "This is a very lo...");
    assert_eq!(note_preview(&note, 200), "This is a very long sentence that should be shortened");
}

const CURRENT: EditedFields<'static> = EditedFields {
    title: "Title",
    content: "body",
    image: Some(&[1u8, 2]),
};

#[test]
fn build_edit_patch_only_carries_changes() {
    assert_eq!(
        build_edit_patch(
            CURRENT,
            Some("Title".into()),
            Some("body".into()),
            Some(Some(vec![1, 2]))
        ),
        None
    );

    let patch =
        build_edit_patch(CURRENT, Some("Renamed".into()), Some("body".into()), None).unwrap();
    assert_eq!(patch.title.as_deref(), Some("Renamed"));
    assert_eq!(patch.content, None);
    assert_eq!(patch.image, None);
    assert_eq!(patch.synced, Some(false));
    assert!(patch.updated_at.is_some());
}

#[test]
fn build_edit_patch_replaces_or_clears_image() {
    let replaced = build_edit_patch(CURRENT, None, None, Some(Some(vec![9]))).unwrap();
    assert_eq!(replaced.image, Some(Some(vec![9])));
    assert_eq!(replaced.title, None);

    let cleared = build_edit_patch(CURRENT, None, None, Some(None)).unwrap();
    assert_eq!(cleared.image, Some(None));

    let no_image = EditedFields {
        image: None,
        ..CURRENT
    };
    assert_eq!(build_edit_patch(no_image, None, None, Some(None)), None);
}

#[test]
fn profile_lines_show_missing_display_name() {
    let mut account = UserProfile {
        id: "user-1".into(),
        display_name: None,
    };
    assert_eq!(
        format_profile_lines(&account),
        vec!["user:         user-1", "display name: (not set)"]
    );

    account.display_name = Some("Ada".into());
    assert_eq!(format_profile_lines(&account)[1], "display name: Ada");
}

#[test]
fn init_profile_merges_and_activates() {
    let mut config = CliProfilesConfig::default();

    let missing = init_profile(
        &mut config,
        "work",
        ProfileInput {
            supabase_url: Some("https://work.supabase.co".into()),
            supabase_anon_key: None,
        },
        false,
    )
    .unwrap();
    assert_eq!(missing, vec!["supabase_anon_key"]);
    assert_eq!(config.active_profile.as_deref(), Some("work"));

    let missing = init_profile(
        &mut config,
        "work",
        ProfileInput {
            supabase_url: None,
            supabase_anon_key: Some("anon".into()),
        },
        false,
    )
    .unwrap();
    assert!(missing.is_empty());
    let profile = config.profile("work").unwrap();
    assert_eq!(profile.supabase_url.as_deref(), Some("https://work.supabase.co"));
    assert!(profile.backend_config().unwrap().is_some());
}

#[test]
fn init_profile_respects_no_activate_and_rejects_bad_url() {
    let mut config = CliProfilesConfig {
        active_profile: Some("default".into()),
        ..CliProfilesConfig::default()
    };

    init_profile(&mut config, "side", ProfileInput::default(), true).unwrap();
    assert_eq!(config.active_profile.as_deref(), Some("default"));

    let error = init_profile(
        &mut config,
        "side",
        ProfileInput {
            supabase_url: Some("side.supabase.co".into()),
            supabase_anon_key: None,
        },
        true,
    )
    .unwrap_err();
    assert!(matches!(error, CliError::Backend(_)));
}

#[test]
fn status_lines_mention_pending_push() {
    let lines = format_status_lines(&StatusCounts {
        local_only: 2,
        synced: 3,
        dirty: 1,
    });
    assert_eq!(lines[0], "local-only  2");
    assert_eq!(lines[3], "3 note(s) waiting for `jotter sync push`");

    let clean = format_status_lines(&StatusCounts {
        local_only: 0,
        synced: 1,
        dirty: 0,
    });
    assert_eq!(clean.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn render_note_shows_sync_fields() {
    let db = DatabaseService::open_in_memory().await.unwrap();
    let id = db
        .create(&NewNote {
            server_id: Some(ServerId::new("srv-1")),
            owner_id: Some("user-1".into()),
            synced: true,
            ..note_at("Trip", "pack bags\nbook hotel", 2_000)
        })
        .await
        .unwrap();
    let note = db.get(id).await.unwrap().unwrap();

    let lines = render_note(&note);
    assert_eq!(lines[0], "# Trip");
    assert!(lines.contains(&"status:  synced".to_string()));
    assert!(lines.contains(&"server:  srv-1".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("book hotel"));

    let item = serde_json::to_value(note_to_list_item(&note)).unwrap();
    assert_eq!(item["server_id"], "srv-1");
    assert_eq!(item["status"], "synced");
}

#[tokio::test(flavor = "multi_thread")]
async fn list_notes_respects_limit_and_order() {
    let (_dir, db_path) = test_db_path();
    let db = DatabaseService::open_path(&db_path).await.unwrap();
    db.create(&note_at("First", "", 1_000)).await.unwrap();
    db.create(&note_at("Second", "", 2_000)).await.unwrap();
    db.create(&note_at("Third", "", 3_000)).await.unwrap();

    let recent = list_notes(2, &db).await.unwrap();
    let titles = recent.iter().map(|note| note.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["Third", "Second"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn add_then_edit_marks_note_dirty() {
    let (_dir, db_path) = test_db_path();
    run_add("Groceries", &["milk".to_string(), "eggs".to_string()], false, None, &db_path)
        .await
        .unwrap();

    let db = DatabaseService::open_path(&db_path).await.unwrap();
    let note = db.list_all().await.unwrap().remove(0);
    assert_eq!(note.content, "milk eggs");
    assert_eq!(note.sync_status(), SyncStatus::LocalOnly);

    db.update(
        note.local_id,
        &NotePatch::pushed(ServerId::new("srv-9"), "user-1"),
    )
    .await
    .unwrap();
    drop(db);

    run_edit(&note.local_id.to_string(), Some("Shopping"), None, None, &db_path)
        .await
        .unwrap();

    let db = DatabaseService::open_path(&db_path).await.unwrap();
    let edited = db.get(note.local_id).await.unwrap().unwrap();
    assert_eq!(edited.title, "Shopping");
    assert_eq!(edited.content, "milk eggs");
    assert_eq!(edited.sync_status(), SyncStatus::Dirty);
}

#[tokio::test(flavor = "multi_thread")]
async fn image_can_be_attached_replaced_and_cleared() {
    let (dir, db_path) = test_db_path();
    let first = dir.path().join("sketch.png");
    let second = dir.path().join("photo.jpg");
    std::fs::write(&first, [0x89, b'P', b'N', b'G']).unwrap();
    std::fs::write(&second, [0xff, 0xd8]).unwrap();

    run_add("Sketch", &["draft".to_string()], false, Some(&first), &db_path)
        .await
        .unwrap();
    let db = DatabaseService::open_path(&db_path).await.unwrap();
    let note = db.list_all().await.unwrap().remove(0);
    assert_eq!(note.image.as_deref(), Some(&[0x89, b'P', b'N', b'G'][..]));
    drop(db);

    let id = note.local_id.to_string();
    run_edit(&id, None, None, Some(ImageChange::Replace(second)), &db_path)
        .await
        .unwrap();
    let db = DatabaseService::open_path(&db_path).await.unwrap();
    let replaced = db.get(note.local_id).await.unwrap().unwrap();
    assert_eq!(replaced.image, Some(vec![0xff, 0xd8]));
    assert_eq!(replaced.content, "draft");
    drop(db);

    run_edit(&id, None, None, Some(ImageChange::Clear), &db_path)
        .await
        .unwrap();
    let db = DatabaseService::open_path(&db_path).await.unwrap();
    assert_eq!(db.get(note.local_id).await.unwrap().unwrap().image, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn add_rejects_missing_or_empty_image() {
    let (dir, db_path) = test_db_path();
    let empty = dir.path().join("empty.png");
    std::fs::write(&empty, b"").unwrap();

    let error = run_add("Pic", &["x".to_string()], false, Some(&empty), &db_path)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::EmptyImage(_)));

    let missing = dir.path().join("missing.png");
    let error = run_add("Pic", &["x".to_string()], false, Some(&missing), &db_path)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::Io(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn add_rejects_blank_title() {
    let (_dir, db_path) = test_db_path();
    let error = run_add("  ", &["body".to_string()], false, None, &db_path)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::EmptyTitle));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_note_and_missing_id_fails() {
    let (_dir, db_path) = test_db_path();
    let db = DatabaseService::open_path(&db_path).await.unwrap();
    let id = db.create(&NewNote::local("Gone soon", "")).await.unwrap();
    drop(db);

    run_delete(&id.to_string(), &db_path).await.unwrap();

    let db = DatabaseService::open_path(&db_path).await.unwrap();
    assert!(db.get(id).await.unwrap().is_none());
    let error = resolve_note(&id.to_string(), &db).await.unwrap_err();
    assert!(matches!(error, CliError::NoteNotFound(_)));

    let error = run_delete(&id.to_string(), &db_path).await.unwrap_err();
    assert!(matches!(error, CliError::NoteNotFound(_)));
}

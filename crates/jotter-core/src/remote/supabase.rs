//! Supabase (PostgREST) implementation of `RemoteStore`.
//!
//! Rows live in the `notes` table with columns `id`, `title`, `content`,
//! `created_at`, `updated_at` and `user_id`. Row-level security on the
//! server restricts every request to the caller's own rows.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::auth::parse_api_error;
use crate::config::BackendConfig;
use crate::models::{RemoteNote, RemoteNoteDraft, RemoteNoteUpdate, ServerId};
use crate::session::SharedSession;

const NOTES_TABLE: &str = "notes";

#[derive(Clone)]
pub struct SupabaseNoteStore {
    notes_url: String,
    anon_key: String,
    client: Client,
    session: SharedSession,
}

impl SupabaseNoteStore {
    pub fn new(config: &BackendConfig, session: SharedSession) -> RemoteResult<Self> {
        Ok(Self {
            notes_url: format!("{}/{NOTES_TABLE}", config.rest_url()),
            anon_key: config.supabase_anon_key.clone(),
            client: Client::builder().timeout(config.request_timeout).build()?,
            session,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RemoteResult<RequestBuilder> {
        let token = self
            .session
            .access_token()
            .ok_or(RemoteError::Unauthenticated)?;
        Ok(request
            .header("apikey", &self.anon_key)
            .header("Accept", "application/json")
            .bearer_auth(token))
    }

    async fn send_for_rows(&self, request: RequestBuilder) -> RemoteResult<Vec<NoteRow>> {
        let response = self.authorized(request)?.send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<Vec<NoteRow>>().await?)
    }
}

impl RemoteStore for SupabaseNoteStore {
    async fn insert(&self, draft: &RemoteNoteDraft) -> RemoteResult<ServerId> {
        let payload = InsertPayload::try_from(draft)?;
        let request = self
            .client
            .post(&self.notes_url)
            .header("Prefer", "return=representation")
            .json(&payload);

        let row = self
            .send_for_rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RemoteError::Validation("insert returned no row representation".to_string())
            })?;

        let id = row.id.into_server_id();
        tracing::debug!("Inserted remote note {}", id);
        Ok(id)
    }

    async fn update(&self, id: &ServerId, fields: &RemoteNoteUpdate) -> RemoteResult<()> {
        let payload = UpdatePayload::try_from(fields)?;
        let request = self
            .client
            .patch(&self.notes_url)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&payload);

        // PostgREST answers an update matching zero rows with an empty array
        let rows = self.send_for_rows(request).await?;
        if rows.is_empty() {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: &str) -> RemoteResult<Vec<RemoteNote>> {
        let request = self.client.get(&self.notes_url).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{owner_id}")),
            ("order", "updated_at.desc".to_string()),
        ]);

        self.send_for_rows(request)
            .await?
            .into_iter()
            .map(RemoteNote::try_from)
            .collect()
    }
}

pub(super) async fn check_status(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

fn error_for_status(status: StatusCode, body: &str) -> RemoteError {
    let message = parse_api_error(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthenticated,
        StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            RemoteError::Validation(message)
        }
        _ => RemoteError::Connection(message),
    }
}

fn format_timestamp(millis: i64) -> RemoteResult<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|value| value.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| RemoteError::Validation(format!("timestamp {millis} is out of range")))
}

/// Accepts `timestamptz` output and bare `timestamp` output (read as UTC).
fn parse_timestamp(raw: &str) -> RemoteResult<i64> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Ok(value.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|value| value.and_utc().timestamp_millis())
        .map_err(|_| RemoteError::Validation(format!("unrecognized timestamp '{raw}'")))
}

#[derive(Debug, Serialize)]
struct InsertPayload<'a> {
    title: &'a str,
    content: &'a str,
    created_at: String,
    updated_at: String,
    user_id: &'a str,
}

impl<'a> TryFrom<&'a RemoteNoteDraft> for InsertPayload<'a> {
    type Error = RemoteError;

    fn try_from(draft: &'a RemoteNoteDraft) -> RemoteResult<Self> {
        Ok(Self {
            title: &draft.title,
            content: &draft.content,
            created_at: format_timestamp(draft.created_at)?,
            updated_at: format_timestamp(draft.updated_at)?,
            user_id: &draft.owner_id,
        })
    }
}

#[derive(Debug, Serialize)]
struct UpdatePayload<'a> {
    title: &'a str,
    content: &'a str,
    updated_at: String,
}

impl<'a> TryFrom<&'a RemoteNoteUpdate> for UpdatePayload<'a> {
    type Error = RemoteError;

    fn try_from(fields: &'a RemoteNoteUpdate) -> RemoteResult<Self> {
        Ok(Self {
            title: &fields.title,
            content: &fields.content,
            updated_at: format_timestamp(fields.updated_at)?,
        })
    }
}

/// Row ids may be `uuid` or `bigint` depending on the table definition.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

impl RowId {
    fn into_server_id(self) -> ServerId {
        match self {
            Self::Text(value) => ServerId::new(value),
            Self::Number(value) => ServerId::new(value.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NoteRow {
    id: RowId,
    title: String,
    #[serde(default)]
    content: Option<String>,
    created_at: String,
    updated_at: String,
    user_id: String,
}

impl TryFrom<NoteRow> for RemoteNote {
    type Error = RemoteError;

    fn try_from(row: NoteRow) -> RemoteResult<Self> {
        let created_at = parse_timestamp(&row.created_at)?;
        let updated_at = parse_timestamp(&row.updated_at)?;
        Ok(Self {
            server_id: row.id.into_server_id(),
            title: row.title,
            content: row.content.unwrap_or_default(),
            created_at,
            updated_at,
            owner_id: row.user_id,
        })
    }
}

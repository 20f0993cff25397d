//! Account profile rows in the Supabase `profiles` table.
//!
//! One row per user, keyed by the auth user id. Only `display_name` is
//! editable from here.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::supabase::check_status;
use super::{RemoteError, RemoteResult};
use crate::config::BackendConfig;
use crate::session::{SessionContext, SharedSession};
use crate::util::normalize_text_option;

const PROFILES_TABLE: &str = "profiles";

/// Profile of the signed-in user as stored on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Clone)]
pub struct SupabaseProfileClient {
    profiles_url: String,
    anon_key: String,
    client: Client,
    session: SharedSession,
}

impl SupabaseProfileClient {
    pub fn new(config: &BackendConfig, session: SharedSession) -> RemoteResult<Self> {
        Ok(Self {
            profiles_url: format!("{}/{PROFILES_TABLE}", config.rest_url()),
            anon_key: config.supabase_anon_key.clone(),
            client: Client::builder().timeout(config.request_timeout).build()?,
            session,
        })
    }

    /// Fetch the current user's profile
    pub async fn fetch(&self) -> RemoteResult<UserProfile> {
        let user_id = self.user_id()?;
        let request = self
            .client
            .get(&self.profiles_url)
            .query(&profile_query(&user_id));
        self.send_for_profile(request, &user_id).await
    }

    /// Set or clear the display name; a blank name clears it
    pub async fn update_display_name(&self, display_name: &str) -> RemoteResult<UserProfile> {
        let user_id = self.user_id()?;
        let request = self
            .client
            .patch(&self.profiles_url)
            .query(&[("id", format!("eq.{user_id}"))])
            .header("Prefer", "return=representation")
            .json(&DisplayNamePayload::new(display_name));

        let profile = self.send_for_profile(request, &user_id).await?;
        tracing::debug!("Updated display name for {}", profile.id);
        Ok(profile)
    }

    fn user_id(&self) -> RemoteResult<String> {
        self.session
            .current_user_id()
            .ok_or(RemoteError::Unauthenticated)
    }

    async fn send_for_profile(
        &self,
        request: RequestBuilder,
        user_id: &str,
    ) -> RemoteResult<UserProfile> {
        let token = self
            .session
            .access_token()
            .ok_or(RemoteError::Unauthenticated)?;
        let response = request
            .header("apikey", &self.anon_key)
            .header("Accept", "application/json")
            .bearer_auth(token)
            .send()
            .await?;
        let rows = check_status(response).await?.json::<Vec<UserProfile>>().await?;
        first_profile(rows, user_id)
    }
}

fn profile_query(user_id: &str) -> [(&'static str, String); 2] {
    [("select", "*".to_string()), ("id", format!("eq.{user_id}"))]
}

/// Row-level security hides other users' rows, so an empty answer means
/// the profile row does not exist yet.
fn first_profile(rows: Vec<UserProfile>, user_id: &str) -> RemoteResult<UserProfile> {
    rows.into_iter()
        .next()
        .ok_or_else(|| RemoteError::NotFound(format!("profile {user_id}")))
}

#[derive(Debug, Serialize)]
struct DisplayNamePayload {
    display_name: Option<String>,
}

impl DisplayNamePayload {
    fn new(display_name: &str) -> Self {
        Self {
            display_name: normalize_text_option(Some(display_name.to_string())),
        }
    }
}

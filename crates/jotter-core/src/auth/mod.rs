//! Supabase auth client and session types.
//!
//! The auth subsystem owns the signed-in session. Sync code only ever reads
//! it through [`crate::session::SessionContext`].

use std::fmt;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::util::unix_timestamp_now;

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as Unix seconds
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Supabase auth is not configured.")]
    NotConfigured,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where signed-in sessions are kept between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Email/password client for the Supabase auth (GoTrue) endpoints.
#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(config: &BackendConfig, store: S) -> AuthResult<Self> {
        Ok(Self {
            auth_url: config.auth_url(),
            anon_key: config.supabase_anon_key.clone(),
            client: Client::builder().timeout(config.request_timeout).build()?,
            store,
        })
    }

    /// Load the persisted session, refreshing it when expired.
    ///
    /// A session that cannot be refreshed is cleared and `None` returned.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };

        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        validate_credentials(email, password)?;

        let request = self.client.post(format!("{}/signup", self.auth_url)).json(
            &serde_json::json!({
                "email": email,
                "password": password,
            }),
        );

        match self.send(request).await?.into_session()? {
            Some(session) => {
                self.store.save_session(&session)?;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;

        let request = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }));

        self.exchange_for_session(request, "Sign-in").await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let request = self
            .client
            .post(format!("{}/token", self.auth_url))
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }));

        self.exchange_for_session(request, "Refresh").await
    }

    /// Revoke the session server-side and forget it locally.
    ///
    /// An already-invalid token (401) still counts as signed out.
    pub async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !(status.is_success() || status == StatusCode::UNAUTHORIZED) {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        self.store.clear_session()?;
        Ok(())
    }

    async fn exchange_for_session(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> AuthResult<AuthSession> {
        let session = self.send(request).await?.into_session()?.ok_or_else(|| {
            AuthError::Api(format!("{action} response did not include an active session"))
        })?;
        self.store.save_session(&session)?;
        Ok(session)
    }

    async fn send(&self, request: RequestBuilder) -> AuthResult<TokenResponse> {
        let response = request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(())
}

/// Token endpoint payload. Sign-up nests the tokens under `session`.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<UserPayload>,
    session: Option<Box<TokenResponse>>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let nested = self.session.map(|nested| *nested).unwrap_or_default();

        let access_token = self.access_token.or(nested.access_token);
        let refresh_token = self.refresh_token.or(nested.refresh_token);
        let expires_at = self.expires_at.or(nested.expires_at).or_else(|| {
            self.expires_in
                .or(nested.expires_in)
                .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
        });
        let user = self.user.or(nested.user).map(|user| AuthUser {
            id: user.id,
            email: user.email,
        });

        match (access_token, refresh_token, expires_at, user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user,
                }))
            }
            // Sign-up with email confirmation pending returns only the user
            (None, None, None, Some(_)) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

/// Extract a readable message from a Supabase error response.
pub(crate) fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error_description)
            .or(payload.error)
        {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = crate::util::compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn response_without_session_fields_means_confirmation_required() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"user": {"id": "user", "email": "user@example.com"}}"#,
        )
        .unwrap();
        assert!(response.into_session().unwrap().is_none());
    }

    #[test]
    fn nested_session_fields_are_used() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "session": {
                    "access_token": "a",
                    "refresh_token": "r",
                    "expires_at": 1700000000,
                    "user": {"id": "u1", "email": null}
                }
            }"#,
        )
        .unwrap();

        let session = response.into_session().unwrap().unwrap();
        assert_eq!(session.access_token, "a");
        assert_eq!(session.expires_at, 1_700_000_000);
        assert_eq!(session.user.id, "u1");
    }

    #[test]
    fn partial_session_is_an_error() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "a", "user": {"id": "u1"}}"#,
        )
        .unwrap();
        assert!(matches!(response.into_session(), Err(AuthError::Api(_))));
    }

    #[test]
    fn expires_in_is_converted_to_absolute_time() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token": "a", "refresh_token": "r", "expires_in": 3600, "user": {"id": "u"}}"#,
        )
        .unwrap();
        let session = response.into_session().unwrap().unwrap();
        assert!(!session.is_expired());
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let session = AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
            },
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(session.is_expired());
    }

    #[test]
    fn parse_api_error_prefers_message_fields() {
        let rendered = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#,
        );
        assert_eq!(rendered, "Invalid login credentials (400)");

        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
        assert_eq!(
            parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            "boom (500)"
        );
    }

    #[test]
    fn validate_credentials_requires_both_fields() {
        assert!(validate_credentials("", "pw").is_err());
        assert!(validate_credentials("a@b.c", " ").is_err());
        assert!(validate_credentials("a@b.c", "pw").is_ok());
    }
}

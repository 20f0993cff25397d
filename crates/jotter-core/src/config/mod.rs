//! Backend configuration for client apps.
//!
//! Jotter talks to a single Supabase project: the auth endpoints for
//! sign-in and the REST endpoints for the remote `notes` table. Only the
//! public URL and anon key live here; user credentials never do.

use std::time::Duration;

use thiserror::Error;

use crate::util::{is_http_url, normalize_text_option};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const HTTP_TIMEOUT_ENV: &str = "JOTTER_HTTP_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Missing(&'static str),
    #[error("{0} must include http:// or https://")]
    NotHttp(&'static str),
    #[error("Supabase URL and anon key must be configured together")]
    Incomplete,
    #[error("invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Supabase project endpoints and transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project URL without trailing slash or service suffix
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Per-request timeout for every HTTP call made against the backend
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn new(
        supabase_url: impl Into<String>,
        supabase_anon_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let supabase_url = normalize_text_option(Some(supabase_url.into()))
            .ok_or(ConfigError::Missing("Supabase URL"))?;
        if !is_http_url(&supabase_url) {
            return Err(ConfigError::NotHttp("Supabase URL"));
        }
        let supabase_anon_key = normalize_text_option(Some(supabase_anon_key.into()))
            .ok_or(ConfigError::Missing("Supabase anon key"))?;

        Ok(Self {
            supabase_url: strip_service_suffix(&supabase_url),
            supabase_anon_key,
            request_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a config from optional parts; both absent means "not configured".
    pub fn from_parts(
        supabase_url: Option<String>,
        supabase_anon_key: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        match (
            normalize_text_option(supabase_url),
            normalize_text_option(supabase_anon_key),
        ) {
            (None, None) => Ok(None),
            (Some(url), Some(key)) => Self::new(url, key).map(Some),
            _ => Err(ConfigError::Incomplete),
        }
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `JOTTER_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(config) = Self::from_parts(
            std::env::var(SUPABASE_URL_ENV).ok(),
            std::env::var(SUPABASE_ANON_KEY_ENV).ok(),
        )?
        else {
            return Ok(None);
        };

        match normalize_text_option(std::env::var(HTTP_TIMEOUT_ENV).ok()) {
            Some(raw) => {
                let secs = parse_timeout_secs(&raw)?;
                Ok(Some(config.with_request_timeout(Duration::from_secs(secs))))
            }
            None => Ok(Some(config)),
        }
    }

    /// Base URL of the auth (GoTrue) API.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }

    /// Base URL of the REST (PostgREST) API.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.supabase_url)
    }
}

fn parse_timeout_secs(raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            name: HTTP_TIMEOUT_ENV,
            value: raw.to_string(),
        })
}

fn strip_service_suffix(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed
        .strip_suffix("/auth/v1")
        .or_else(|| trimmed.strip_suffix("/rest/v1"))
        .unwrap_or(trimmed)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_url_and_derives_endpoints() {
        let config = BackendConfig::new(" https://demo.supabase.co/ ", " anon ").unwrap();
        assert_eq!(config.supabase_url, "https://demo.supabase.co");
        assert_eq!(config.supabase_anon_key, "anon");
        assert_eq!(config.auth_url(), "https://demo.supabase.co/auth/v1");
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn new_strips_existing_service_suffix() {
        let config = BackendConfig::new("https://demo.supabase.co/auth/v1", "anon").unwrap();
        assert_eq!(config.auth_url(), "https://demo.supabase.co/auth/v1");

        let config = BackendConfig::new("https://demo.supabase.co/rest/v1/", "anon").unwrap();
        assert_eq!(config.rest_url(), "https://demo.supabase.co/rest/v1");
    }

    #[test]
    fn new_rejects_invalid_values() {
        assert_eq!(
            BackendConfig::new("", "anon").unwrap_err(),
            ConfigError::Missing("Supabase URL")
        );
        assert_eq!(
            BackendConfig::new("demo.supabase.co", "anon").unwrap_err(),
            ConfigError::NotHttp("Supabase URL")
        );
        assert_eq!(
            BackendConfig::new("https://demo.supabase.co", "  ").unwrap_err(),
            ConfigError::Missing("Supabase anon key")
        );
    }

    #[test]
    fn from_parts_requires_both_or_neither() {
        assert_eq!(BackendConfig::from_parts(None, Some(" ".into())), Ok(None));
        assert_eq!(
            BackendConfig::from_parts(Some("https://x.supabase.co".into()), None),
            Err(ConfigError::Incomplete)
        );
        assert!(BackendConfig::from_parts(
            Some("https://x.supabase.co".into()),
            Some("anon".into())
        )
        .unwrap()
        .is_some());
    }

    #[test]
    fn timeout_must_be_positive_integer() {
        assert_eq!(parse_timeout_secs("30"), Ok(30));
        assert!(parse_timeout_secs("0").is_err());
        assert!(parse_timeout_secs("soon").is_err());
    }
}

//! Outbound access token acquisition and caching.
//!
//! Tokens are obtained from an OAuth token endpoint with the password grant and
//! kept in a single cache slot. A cached token is reused until five minutes
//! before it expires. The slot is guarded by an async mutex held across
//! check-then-refresh, so concurrent callers wait for one refresh instead of
//! each issuing their own.

use crate::domain::ports::TokenSource;
use crate::utils::error::TokenError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;
use tokio::sync::Mutex;

/// Margin subtracted from a token's expiry before it is considered stale.
pub const REFRESH_SKEW_SECONDS: i64 = 5 * 60;

/// Password-grant credentials for the token endpoint.
///
/// Fields are optional so that a missing value surfaces on first use as
/// [`TokenError::MissingConfiguration`] rather than at construction.
#[derive(Clone, Default)]
pub struct TokenEndpointConfig {
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for TokenEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEndpointConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl TokenEndpointConfig {
    fn token_url(&self) -> Result<&str, TokenError> {
        required(&self.token_url, "crm_authentication.token_url")
    }

    fn password_grant_form(&self) -> Result<[(&'static str, &str); 6], TokenError> {
        Ok([
            ("client_id", required(&self.client_id, "crm_authentication.client_id")?),
            (
                "client_secret",
                required(&self.client_secret, "crm_authentication.client_secret")?,
            ),
            ("scope", required(&self.scope, "crm_authentication.scope")?),
            ("grant_type", "password"),
            ("username", required(&self.username, "CRM_USERNAME")?),
            ("password", required(&self.password, "CRM_PASSWORD")?),
        ])
    }
}

fn required<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, TokenError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or(TokenError::MissingConfiguration(key))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(REFRESH_SKEW_SECONDS)
    }
}

pub struct TokenProvider {
    http: reqwest::Client,
    endpoint: TokenEndpointConfig,
    cache: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, endpoint: TokenEndpointConfig) -> Self {
        Self {
            http,
            endpoint,
            cache: Mutex::new(None),
        }
    }

    /// Returns a usable access token, refreshing it when the cached one is
    /// missing or inside the refresh skew.
    pub async fn get_token(&self) -> Result<String, TokenError> {
        let mut slot = self.cache.lock().await;

        if let Some(cached) = slot.as_ref().filter(|t| t.is_usable_at(Utc::now())) {
            tracing::debug!("Using cached CRM authentication token");
            return Ok(cached.value.clone());
        }

        tracing::info!("Requesting new CRM authentication token");

        let token_url = self.endpoint.token_url()?;
        let form = self.endpoint.password_grant_form()?;

        match self.request_token(token_url, &form).await {
            Ok((fresh, expires_in)) => {
                tracing::info!(
                    expires_in,
                    "Successfully obtained CRM authentication token"
                );
                let value = fresh.value.clone();
                *slot = Some(fresh);
                Ok(value)
            }
            Err(e) => {
                tracing::error!(
                    token_url = %token_url,
                    error = %e,
                    "Failed to obtain CRM authentication token"
                );
                Err(e)
            }
        }
    }

    /// Drops the cached token so the next call goes to the token endpoint.
    pub async fn invalidate(&self) {
        self.cache.lock().await.take();
    }

    async fn request_token(
        &self,
        token_url: &str,
        form: &[(&'static str, &str)],
    ) -> Result<(CachedToken, i64), TokenError> {
        let response = self
            .http
            .post(token_url)
            .form(form)
            .send()
            .await
            .map_err(TokenError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(TokenError::Transport)?;

        if !status.is_success() {
            return Err(TokenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(TokenError::InvalidResponse)?;
        let value = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::MissingAccessToken)?;

        let expires_at = expiry_from(Utc::now(), parsed.expires_in)
            .ok_or(TokenError::InvalidExpiry(parsed.expires_in))?;

        let token = CachedToken { value, expires_at };
        Ok((token, parsed.expires_in))
    }
}

/// `None` for a negative lifetime or one that overflows the calendar.
fn expiry_from(now: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    if expires_in < 0 {
        return None;
    }
    Duration::try_seconds(expires_in).and_then(|ttl| now.checked_add_signed(ttl))
}

#[async_trait]
impl TokenSource for TokenProvider {
    async fn get_token(&self) -> Result<String, TokenError> {
        TokenProvider::get_token(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> TokenEndpointConfig {
        TokenEndpointConfig {
            token_url: Some("https://login.example.com/token".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            scope: Some("crm.read".to_string()),
            username: Some("svc-user".to_string()),
            password: Some("hunter2".to_string()),
        }
    }

    #[test]
    fn test_cached_token_respects_refresh_skew() {
        let now = Utc::now();
        let fresh = CachedToken {
            value: "a".to_string(),
            expires_at: now + Duration::seconds(3600),
        };
        let inside_skew = CachedToken {
            value: "b".to_string(),
            expires_at: now + Duration::seconds(REFRESH_SKEW_SECONDS - 1),
        };
        let expired = CachedToken {
            value: "c".to_string(),
            expires_at: now - Duration::seconds(1),
        };

        assert!(fresh.is_usable_at(now));
        assert!(!inside_skew.is_usable_at(now));
        assert!(!expired.is_usable_at(now));
    }

    #[test]
    fn test_expiry_rejects_negative_and_overflowing_lifetimes() {
        let now = Utc::now();
        assert_eq!(expiry_from(now, 3600), Some(now + Duration::seconds(3600)));
        assert_eq!(expiry_from(now, 0), Some(now));
        assert_eq!(expiry_from(now, -1), None);
        assert_eq!(expiry_from(now, 9_000_000_000_000_000_000), None);
        assert_eq!(expiry_from(now, i64::MAX), None);
    }

    #[test]
    fn test_password_grant_form_fields() {
        let config = full_config();
        let form = config.password_grant_form().unwrap();
        assert!(form.contains(&("grant_type", "password")));
        assert!(form.contains(&("username", "svc-user")));
        assert!(form.contains(&("scope", "crm.read")));
    }

    #[test]
    fn test_missing_credentials_are_reported_by_key() {
        let config = TokenEndpointConfig {
            password: None,
            ..full_config()
        };
        match config.password_grant_form() {
            Err(TokenError::MissingConfiguration(key)) => assert_eq!(key, "CRM_PASSWORD"),
            other => panic!("expected MissingConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", full_config());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_missing_token_url_fails_without_network() {
        let provider = TokenProvider::new(
            reqwest::Client::new(),
            TokenEndpointConfig {
                token_url: None,
                ..full_config()
            },
        );

        match provider.get_token().await {
            Err(TokenError::MissingConfiguration(key)) => {
                assert_eq!(key, "crm_authentication.token_url")
            }
            other => panic!("expected MissingConfiguration, got {:?}", other),
        }
    }
}

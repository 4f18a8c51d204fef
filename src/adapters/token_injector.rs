use crate::domain::model::OperatingMode;
use crate::domain::ports::TokenSource;
use reqwest::RequestBuilder;
use std::fmt;
use std::sync::Arc;

/// Attaches `Authorization: Bearer <token>` to every outbound CRM request.
#[derive(Clone)]
pub enum TokenInjector {
    Static {
        token: String,
    },
    /// Falls back to `fallback_token` when the provider fails, so a token
    /// service outage does not block CRM traffic the CRM would still accept.
    Dynamic {
        provider: Arc<dyn TokenSource>,
        fallback_token: String,
    },
}

impl fmt::Debug for TokenInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInjector")
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl TokenInjector {
    pub fn static_token(token: impl Into<String>) -> Self {
        TokenInjector::Static {
            token: token.into(),
        }
    }

    pub fn dynamic(provider: Arc<dyn TokenSource>, fallback_token: impl Into<String>) -> Self {
        TokenInjector::Dynamic {
            provider,
            fallback_token: fallback_token.into(),
        }
    }

    pub fn mode(&self) -> OperatingMode {
        match self {
            TokenInjector::Static { .. } => OperatingMode::Static,
            TokenInjector::Dynamic { .. } => OperatingMode::Dynamic,
        }
    }

    /// Resolves the bearer credential for the next outbound call. Never fails.
    pub async fn bearer_token(&self) -> String {
        match self {
            TokenInjector::Static { token } => {
                tracing::info!("Using static bearer token for CRM request");
                token.clone()
            }
            TokenInjector::Dynamic {
                provider,
                fallback_token,
            } => match provider.get_token().await {
                Ok(token) => {
                    tracing::debug!("Using dynamic CRM token for request");
                    token
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Failed to obtain dynamic CRM token, falling back to static bearer token"
                    );
                    fallback_token.clone()
                }
            },
        }
    }

    pub async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.bearer_token().await)
    }
}

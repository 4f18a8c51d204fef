//! Inbound caller authentication with a single static bearer token.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::api::error::unauthorized;
use crate::api::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct InboundAuth {
    token: String,
}

impl fmt::Debug for InboundAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundAuth")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingHeader,
    InvalidFormat,
    InvalidToken,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "Missing Authorization header",
            AuthFailure::InvalidFormat => "Invalid Authorization header format",
            AuthFailure::InvalidToken => "Invalid token",
        }
    }
}

impl InboundAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Checks an `Authorization` header value. The scheme is matched
    /// case-insensitively and the token is compared in constant time.
    pub fn authenticate(&self, header_value: Option<&str>) -> Result<(), AuthFailure> {
        let header_value = header_value.ok_or(AuthFailure::MissingHeader)?;

        let has_scheme = header_value
            .get(..BEARER_PREFIX.len())
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case(BEARER_PREFIX));
        if !has_scheme {
            return Err(AuthFailure::InvalidFormat);
        }

        let provided = header_value[BEARER_PREFIX.len()..].trim();
        if constant_time_token_eq(provided, &self.token) {
            Ok(())
        } else {
            Err(AuthFailure::InvalidToken)
        }
    }
}

fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

pub async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    match state.auth.authenticate(header_value) {
        Ok(()) => next.run(request).await,
        Err(failure) => {
            tracing::warn!(reason = failure.message(), "Inbound authentication failed");
            unauthorized(failure.message()).into_response()
        }
    }
}

//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::utils::error::LookupFailure;

/// Error response body: `{ "error": "<message>" }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

impl LookupFailure {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupFailure::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            LookupFailure::NoData => StatusCode::NOT_FOUND,
            LookupFailure::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            LookupFailure::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            LookupFailure::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LookupFailure {
    fn into_response(self) -> Response {
        // Display text is the stable caller-facing message; the cause stays internal.
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

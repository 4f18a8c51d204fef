//! Request handlers

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use std::error::Error as _;

use crate::api::dto::CustomerInfoResponse;
use crate::api::AppState;
use crate::utils::error::{InvalidIdReason, LookupFailure};

/// Liveness probe
pub async fn health_check() -> &'static str {
    "ok"
}

/// `GET /api/customer/info/{id}`
pub async fn get_customer_info(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<CustomerInfoResponse>, LookupFailure> {
    // A segment that does not decode to UTF-8 cannot be an integer.
    let Path(id) = path.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Invalid customer ID in path");
        LookupFailure::InvalidIdentifier(InvalidIdReason::NotAnInteger)
    })?;

    tracing::info!(customer_id = %id, "Getting customer info");

    match state.lookup.get_customer_info(&id).await {
        Ok(customer) => {
            tracing::info!(customer_id = %id, "Successfully retrieved customer info");
            Ok(Json(customer.into()))
        }
        Err(failure) => {
            log_failure(&id, &failure);
            Err(failure)
        }
    }
}

fn log_failure(id: &str, failure: &LookupFailure) {
    match failure {
        LookupFailure::InvalidIdentifier(reason) => {
            tracing::warn!(customer_id = %id, %reason, "Invalid customer ID");
        }
        LookupFailure::NoData => {
            tracing::info!(customer_id = %id, "No customer data found");
        }
        other => {
            let cause = other
                .source()
                .map(|c| c.to_string())
                .unwrap_or_default();
            tracing::error!(
                customer_id = %id,
                error = %other,
                cause = %cause,
                "Error retrieving customer info"
            );
        }
    }
}

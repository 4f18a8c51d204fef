//! Inbound HTTP layer (axum)
//!
//! - `GET /health`: public liveness probe
//! - `GET /api/customer/info/:id`: bearer-authenticated customer lookup

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::auth::{auth_middleware, InboundAuth};
use crate::app::lookup_service::CustomerLookupService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<CustomerLookupService>,
    pub auth: InboundAuth,
}

impl AppState {
    pub fn new(lookup: CustomerLookupService, auth: InboundAuth) -> Self {
        Self {
            lookup: Arc::new(lookup),
            auth,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/customer/info/:id", get(handlers::get_customer_info))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! Wires configuration into the running object graph.

use std::sync::Arc;

use crate::adapters::{HttpCrmClient, TokenInjector, TokenProvider};
use crate::api::auth::InboundAuth;
use crate::api::AppState;
use crate::app::lookup_service::CustomerLookupService;
use crate::config::GatewayConfig;
use crate::domain::model::OperatingMode;
use crate::utils::error::Result;

/// Builds the outbound injector for the configured operating mode.
///
/// The token provider shares the CRM HTTP client, so both honor the
/// active environment's timeout.
pub fn build_token_injector(config: &GatewayConfig, http: &reqwest::Client) -> TokenInjector {
    let crm = config.active_crm();

    match config.operating_mode() {
        OperatingMode::Static => TokenInjector::static_token(crm.bearer_token.clone()),
        OperatingMode::Dynamic => {
            let provider = TokenProvider::new(http.clone(), config.token_endpoint());
            TokenInjector::dynamic(Arc::new(provider), crm.bearer_token.clone())
        }
    }
}

pub fn build_app_state(config: &GatewayConfig) -> Result<AppState> {
    let crm = config.active_crm();

    let http = reqwest::Client::builder().timeout(crm.timeout()).build()?;
    let injector = build_token_injector(config, &http);

    tracing::info!(
        base_url = %crm.base_url,
        mode = %injector.mode(),
        timeout_secs = crm.timeout().as_secs(),
        "Configured external CRM client"
    );

    let client = HttpCrmClient::with_client(http, &crm.base_url, injector)?;
    let lookup = CustomerLookupService::new(Arc::new(client));
    let auth = InboundAuth::new(config.authentication.bearer_token.clone());

    Ok(AppState::new(lookup, auth))
}

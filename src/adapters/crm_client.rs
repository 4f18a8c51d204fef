use crate::adapters::token_injector::TokenInjector;
use crate::domain::model::Customer;
use crate::domain::ports::CrmClient;
use crate::utils::error::{CrmFailure, GatewayError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// Path of the customer endpoint, relative to the configured base.
const CLIENT_DATA_PATH: &str = "api/v1/ClientData";

#[derive(Debug, Clone)]
pub struct HttpCrmClient {
    http: reqwest::Client,
    base_url: Url,
    injector: TokenInjector,
}

impl HttpCrmClient {
    pub fn new(base_url: &str, timeout: Duration, injector: TokenInjector) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url, injector)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, injector: TokenInjector) -> Result<Self> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            injector,
        })
    }

    pub fn customer_url(&self, id: u32) -> String {
        format!("{}{}/{}", self.base_url, CLIENT_DATA_PATH, id)
    }
}

/// Ensures the base ends with `/` so a path prefix such as `/CRMApi` is kept.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&with_slash).map_err(|e| GatewayError::InvalidConfigValueError {
        field: "crm.base_url".to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

#[async_trait]
impl CrmClient for HttpCrmClient {
    async fn fetch_customer(&self, id: u32) -> std::result::Result<Customer, CrmFailure> {
        let url = self.customer_url(id);
        tracing::debug!(%url, "Calling external CRM service");

        let request = self.injector.authorize(self.http.get(&url)).await;
        let response = request
            .send()
            .await
            .map_err(|e| CrmFailure::TransportError(e.into()))?;

        let status = response.status();
        tracing::debug!(%status, customer_id = id, "External CRM responded");

        let body = response
            .text()
            .await
            .map_err(|e| CrmFailure::TransportError(e.into()))?;

        classify_response(id, status, body)
    }
}

fn classify_response(
    id: u32,
    status: StatusCode,
    body: String,
) -> std::result::Result<Customer, CrmFailure> {
    if status.is_success() {
        return parse_customer(id, &body);
    }

    match status {
        StatusCode::NOT_FOUND => Err(CrmFailure::NotFound(id)),
        StatusCode::UNAUTHORIZED => Err(CrmFailure::Unauthorized),
        other => Err(CrmFailure::ServerError(other.as_u16(), body)),
    }
}

fn parse_customer(id: u32, body: &str) -> std::result::Result<Customer, CrmFailure> {
    if body.trim().is_empty() {
        return Err(CrmFailure::DeserializationError {
            id,
            reason: "empty response body".to_string(),
        });
    }

    match serde_json::from_str::<Option<Customer>>(body) {
        Ok(Some(customer)) => Ok(customer),
        Ok(None) => Err(CrmFailure::DeserializationError {
            id,
            reason: "response body was null".to_string(),
        }),
        Err(e) => Err(CrmFailure::DeserializationError {
            id,
            reason: e.to_string(),
        }),
    }
}

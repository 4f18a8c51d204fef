use crate::domain::model::Customer;
use crate::utils::error::{CrmFailure, TokenError};
use async_trait::async_trait;

/// Source of outbound access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn get_token(&self) -> Result<String, TokenError>;
}

/// External CRM lookup. Exactly one attempt per call.
#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn fetch_customer(&self, id: u32) -> Result<Customer, CrmFailure>;
}

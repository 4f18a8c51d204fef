// Adapters layer: concrete implementations for external systems (token endpoint, CRM).

pub mod crm_client;
pub mod token_injector;
pub mod token_provider;

pub use crm_client::HttpCrmClient;
pub use token_injector::TokenInjector;
pub use token_provider::{TokenEndpointConfig, TokenProvider};

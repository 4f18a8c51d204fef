pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::GatewayConfig;

pub use api::{create_router, AppState};
pub use app::{build_app_state, CustomerLookupService};
pub use utils::error::{CrmFailure, GatewayError, LookupFailure, Result, TokenError};

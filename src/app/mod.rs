pub mod bootstrap;
pub mod lookup_service;

pub use bootstrap::build_app_state;
pub use lookup_service::CustomerLookupService;

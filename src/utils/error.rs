use std::fmt;
use thiserror::Error;

/// Fatal startup and configuration errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl GatewayError {
    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            GatewayError::IoError(e) => format!("Could not read a required file: {}", e),
            GatewayError::HttpClientError(_) => "Failed to initialise the outbound HTTP client".to_string(),
            GatewayError::ConfigError { message } => format!("Configuration problem: {}", message),
            GatewayError::ConfigValidationError { field, .. } => {
                format!("Configuration section '{}' is invalid", field)
            }
            GatewayError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            GatewayError::MissingConfigError { field } => {
                format!("Setting '{}' is required but was not provided", field)
            }
        }
    }

    /// 建議的修復方式
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GatewayError::IoError(_) => "Check that the config path exists and is readable",
            GatewayError::HttpClientError(_) => "Check the TLS setup of the host and restart",
            GatewayError::ConfigError { .. } | GatewayError::ConfigValidationError { .. } => {
                "Fix the TOML syntax and make sure every ${VAR} placeholder is exported"
            }
            GatewayError::InvalidConfigValueError { .. } => "Correct the value and restart the gateway",
            GatewayError::MissingConfigError { .. } => {
                "Add the setting to the config file or export the matching environment variable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failures of the outbound token endpoint.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("{0} is not configured")]
    MissingConfiguration(&'static str),

    #[error("token endpoint request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("token endpoint returned status {status}")]
    Status { status: u16, body: String },

    #[error("token endpoint response did not contain an access_token")]
    MissingAccessToken,

    #[error("token endpoint returned an unusable expires_in: {0}")]
    InvalidExpiry(i64),

    #[error("token endpoint response could not be parsed: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

/// Network-level failure reaching the CRM; no HTTP response was received.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportCause {
    message: String,
    timed_out: bool,
    #[source]
    source: Option<reqwest::Error>,
}

impl TransportCause {
    pub fn new(message: impl Into<String>, timed_out: bool) -> Self {
        Self {
            message: message.into(),
            timed_out,
            source: None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl From<reqwest::Error> for TransportCause {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            timed_out: err.is_timeout(),
            source: Some(err),
        }
    }
}

/// Outcome of a CRM call that did not yield a customer.
#[derive(Error, Debug)]
pub enum CrmFailure {
    #[error("customer {0} not found in external CRM system")]
    NotFound(u32),

    #[error("external CRM rejected the outbound credential")]
    Unauthorized,

    #[error("external CRM returned status {0}")]
    ServerError(u16, String),

    #[error("error calling external CRM service: {0}")]
    TransportError(#[source] TransportCause),

    #[error("failed to deserialize customer data for ID {id}: {reason}")]
    DeserializationError { id: u32, reason: String },
}

impl CrmFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CrmFailure::TransportError(cause) if cause.is_timeout())
    }
}

/// Why an inbound identifier was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidIdReason {
    Empty,
    NotAnInteger,
    NotPositive,
}

impl fmt::Display for InvalidIdReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            InvalidIdReason::Empty => "empty",
            InvalidIdReason::NotAnInteger => "not an integer",
            InvalidIdReason::NotPositive => "not positive",
        };
        f.write_str(reason)
    }
}

/// Caller-facing lookup failures. Display text is stable and never carries
/// upstream status text; the CRM cause is reachable through `source()`.
#[derive(Error, Debug)]
pub enum LookupFailure {
    #[error("Invalid customer ID: {0}")]
    InvalidIdentifier(InvalidIdReason),

    #[error("CRM service unavailable")]
    UpstreamUnavailable(#[source] CrmFailure),

    #[error("CRM service timed out")]
    UpstreamTimeout(#[source] CrmFailure),

    #[error("No customer data found")]
    NoData,

    #[error("An error occurred while retrieving customer information")]
    Unexpected(#[source] CrmFailure),
}

impl From<CrmFailure> for LookupFailure {
    fn from(failure: CrmFailure) -> Self {
        match failure {
            CrmFailure::NotFound(_) => LookupFailure::NoData,
            CrmFailure::TransportError(_) if failure.is_timeout() => {
                LookupFailure::UpstreamTimeout(failure)
            }
            CrmFailure::TransportError(_) => LookupFailure::UpstreamUnavailable(failure),
            other => LookupFailure::Unexpected(other),
        }
    }
}

use crate::adapters::token_provider::TokenEndpointConfig;
use crate::domain::model::OperatingMode;
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Environment variables consulted when the config file leaves out the
/// resource-owner credentials.
pub const CRM_USERNAME_ENV: &str = "CRM_USERNAME";
pub const CRM_PASSWORD_ENV: &str = "CRM_PASSWORD";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub authentication: AuthenticationConfig,
    pub crm: CrmConfig,
    pub crm_authentication: Option<CrmAuthenticationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Inbound caller authentication.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthenticationConfig {
    pub bearer_token: String,
}

impl fmt::Debug for AuthenticationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationConfig")
            .field("bearer_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    /// Selects the `development` settings and, unless `mode` says otherwise,
    /// static-token mode.
    #[serde(default)]
    pub use_development: bool,
    pub mode: Option<OperatingMode>,
    pub development: CrmEnvironmentConfig,
    pub production: CrmEnvironmentConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CrmEnvironmentConfig {
    pub base_url: String,
    /// Static token; also the fallback when dynamic token acquisition fails.
    pub bearer_token: String,
    pub timeout_seconds: Option<u64>,
}

impl fmt::Debug for CrmEnvironmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmEnvironmentConfig")
            .field("base_url", &self.base_url)
            .field("bearer_token", &"[REDACTED]")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl CrmEnvironmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}

/// Password-grant settings for the CRM token endpoint.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CrmAuthenticationConfig {
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for CrmAuthenticationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmAuthenticationConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("scope", &self.scope)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GatewayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GatewayError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GatewayError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CRM_CLIENT_SECRET})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GatewayError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 取得目前使用的 CRM 環境設定
    pub fn active_crm(&self) -> &CrmEnvironmentConfig {
        if self.crm.use_development {
            &self.crm.development
        } else {
            &self.crm.production
        }
    }

    pub fn operating_mode(&self) -> OperatingMode {
        self.crm.mode.unwrap_or(if self.crm.use_development {
            OperatingMode::Static
        } else {
            OperatingMode::Dynamic
        })
    }

    /// Token endpoint settings, with username/password falling back to the
    /// `CRM_USERNAME` / `CRM_PASSWORD` environment variables.
    pub fn token_endpoint(&self) -> TokenEndpointConfig {
        let auth = self.crm_authentication.clone().unwrap_or_default();
        TokenEndpointConfig {
            token_url: auth.token_url,
            client_id: auth.client_id,
            client_secret: auth.client_secret,
            scope: auth.scope,
            username: auth.username.or_else(|| std::env::var(CRM_USERNAME_ENV).ok()),
            password: auth.password.or_else(|| std::env::var(CRM_PASSWORD_ENV).ok()),
        }
    }

    pub fn apply_overrides(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_secret(
            "authentication.bearer_token",
            &self.authentication.bearer_token,
        )?;

        let section = if self.crm.use_development {
            "crm.development"
        } else {
            "crm.production"
        };
        let crm = self.active_crm();

        validation::validate_url(&format!("{}.base_url", section), &crm.base_url)?;
        validation::validate_non_empty_secret(&format!("{}.bearer_token", section), &crm.bearer_token)?;
        if let Some(timeout) = crm.timeout_seconds {
            validation::validate_range(
                &format!("{}.timeout_seconds", section),
                timeout,
                1,
                MAX_TIMEOUT_SECONDS,
            )?;
        }

        if self.operating_mode() == OperatingMode::Dynamic {
            let auth = validation::validate_required_field("crm_authentication", &self.crm_authentication)?;
            let token_url =
                validation::validate_required_field("crm_authentication.token_url", &auth.token_url)?;
            validation::validate_url("crm_authentication.token_url", token_url)?;
        }

        Ok(())
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

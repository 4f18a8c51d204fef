use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "crm-gateway")]
#[command(about = "Bearer-authenticated gateway in front of the external CRM customer API")]
pub struct CliConfig {
    #[arg(long, default_value = "gateway.toml", help = "Path to the TOML configuration file")]
    pub config: String,

    #[arg(long, help = "Override [server].host")]
    pub host: Option<String>,

    #[arg(long, help = "Override [server].port")]
    pub port: Option<u16>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

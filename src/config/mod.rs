pub mod toml_config;

pub use toml_config::{ServiceConfig, ServiceSection};

use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "fleetlink")]
#[command(about = "Registry-aware dashboard and availability service for the rental fleet")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file; replaces the flags below when set")]
    pub config: Option<String>,

    #[arg(long, default_value = "dashboard-service")]
    pub name: String,

    #[arg(long, default_value = "127.0.0.1")]
    pub address: String,

    #[arg(long, default_value = "4007")]
    pub port: u16,

    #[arg(long, default_value = "http://127.0.0.1:8500")]
    pub registry_url: String,

    #[arg(long, default_value = "10")]
    pub health_interval_secs: u64,

    #[arg(long, default_value = "2")]
    pub registry_timeout_secs: u64,

    #[arg(long, default_value = "3")]
    pub call_timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

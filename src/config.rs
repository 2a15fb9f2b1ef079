//! Configuration management for the GIF portal client
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub network: NetworkConfig,
    pub program: ProgramConfig,
    pub wallet: WalletConfig,
    pub portal: PortalConfig,
    pub api: ApiConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub commitment: Commitment,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub send_timeout_secs: u64,
    pub confirm_timeout_secs: u64,
    pub confirm_poll_ms: u64,
}

/// When a transaction is considered acknowledged
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    #[default]
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn to_config(self) -> CommitmentConfig {
        match self {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramConfig {
    pub program_id: String,
    pub board_keypair_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub keypair_path: String,
    pub keypair_env: Option<String>,
    #[serde(default)]
    pub auto_connect: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    pub allowed_hosts: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub list_host_marker: String,
    pub tip_lamports: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Settings {
    /// Load settings from the file named by `GIF_PORTAL_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = env::var("GIF_PORTAL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::parse(&config_str)
    }

    fn parse(raw: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(raw);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.network.rpc_urls.is_empty() {
            anyhow::bail!("At least one RPC URL must be configured");
        }
        if self.network.max_retries == 0 {
            anyhow::bail!("network.max_retries must be at least 1");
        }
        for (name, value) in [
            ("send_timeout_secs", self.network.send_timeout_secs),
            ("confirm_timeout_secs", self.network.confirm_timeout_secs),
            ("confirm_poll_ms", self.network.confirm_poll_ms),
        ] {
            if value == 0 {
                anyhow::bail!("network.{} must be greater than zero", name);
            }
        }

        self.program_id()?;

        if self.portal.allowed_hosts.is_empty() {
            anyhow::bail!("portal.allowed_hosts must not be empty");
        }
        if self.portal.allowed_extensions.is_empty() {
            anyhow::bail!("portal.allowed_extensions must not be empty");
        }
        if self.portal.tip_lamports == 0 {
            anyhow::bail!("portal.tip_lamports must be greater than zero");
        }
        if self.portal.list_host_marker.is_empty() {
            tracing::warn!("portal.list_host_marker is empty - no submissions will be filtered");
        }

        Ok(())
    }

    /// Parsed program id
    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.program.program_id)
            .with_context(|| format!("Invalid program id: {}", self.program.program_id))
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    lazy_static::lazy_static! {
        static ref ENV_VAR: regex::Regex =
            regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex");
    }

    let mut result = input.to_string();
    for cap in ENV_VAR.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

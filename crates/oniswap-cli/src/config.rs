//! Connection settings: an optional TOML file under command-line flags.

use alloy::primitives::Address;
use clap::Args;
use eyre::{eyre, Result, WrapErr};
use oniswap::SwapConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Local node used when neither a flag nor the file names one.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// How long to wait for a transaction to be mined.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Flags shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct NetworkArgs {
    /// JSON-RPC endpoint
    #[arg(short, long, global = true)]
    pub rpc_url: Option<String>,

    /// Pool contract address
    #[arg(long, global = true)]
    pub pool: Option<Address>,

    /// Token contract address
    #[arg(long, global = true)]
    pub token: Option<Address>,

    /// Hex private key of the trading account
    #[arg(long, env = "ONISWAP_PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,

    /// TOML file with defaults for the flags above
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Contents of the TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub rpc_url: Option<String>,
    pub pool: Option<Address>,
    pub token: Option<Address>,
    pub refresh_interval_secs: Option<u64>,
    pub confirmation_timeout_secs: Option<u64>,
    pub fee_bps: Option<u32>,
    pub default_token_decimals: Option<u8>,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).wrap_err_with(|| format!("invalid config file {}", path.display()))
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub rpc_url: String,
    pub private_key: Option<String>,
    pub swap: SwapConfig,
    pub confirmation_timeout: Duration,
}

impl Settings {
    /// Merge flags over the config file they point at, if any.
    pub fn from_args(args: &NetworkArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Flags win over the file. Pool and token must come from one of them.
    pub fn merge(args: &NetworkArgs, file: FileConfig) -> Result<Self> {
        let pool = args
            .pool
            .or(file.pool)
            .ok_or_else(|| eyre!("pool address missing, pass --pool or set it in the config file"))?;
        let token = args
            .token
            .or(file.token)
            .ok_or_else(|| eyre!("token address missing, pass --token or set it in the config file"))?;

        let mut swap = SwapConfig::new(pool, token);
        if let Some(secs) = file.refresh_interval_secs {
            if secs == 0 {
                return Err(eyre!("refresh_interval_secs must be at least 1"));
            }
            swap = swap.with_refresh_interval(Duration::from_secs(secs));
        }
        if let Some(fee_bps) = file.fee_bps {
            swap = swap.with_fee_bps(fee_bps);
        }
        if let Some(decimals) = file.default_token_decimals {
            swap = swap.with_default_token_decimals(decimals);
        }

        Ok(Self {
            rpc_url: args
                .rpc_url
                .clone()
                .or(file.rpc_url)
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            private_key: args.private_key.clone(),
            swap,
            confirmation_timeout: file
                .confirmation_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT),
        })
    }
}

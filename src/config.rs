//! Linker configuration

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::time::Duration;

use crate::address_codec::{DEFAULT_SS58_FORMAT, MAX_SS58_FORMAT};
use crate::call::CallIndex;
use crate::redact::SecretKey;

/// Linker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// CENNZnet node HTTP RPC URL
    pub rpc_url: String,
    /// Ethereum private key for the local signing oracle
    pub eth_private_key: Option<SecretKey>,

    /// Dispatch index of `ethWallet.call` in the target runtime (e.g. 0x1600)
    pub eth_wallet_call: CallIndex,
    /// Dispatch index of `system.remark`
    pub remark_call: CallIndex,

    /// SS58 format the derived address is rendered with
    pub ss58_format: u16,
    /// Message carried by the remark call
    pub remark_message: String,

    /// HTTP request timeout in milliseconds
    pub rpc_timeout_ms: u64,
    /// Sign and derive only, skip submission
    pub dry_run: bool,
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        Self::from_env()
    }

    /// Read configuration from the process environment only
    pub fn from_env() -> Result<Self> {
        let rpc_url =
            env::var("CENNZNET_RPC_URL").map_err(|_| eyre!("CENNZNET_RPC_URL required"))?;
        url::Url::parse(&rpc_url)
            .wrap_err_with(|| format!("Invalid CENNZNET_RPC_URL: {}", rpc_url))?;

        let eth_wallet_call = env::var("ETH_WALLET_CALL_INDEX")
            .map_err(|_| eyre!("ETH_WALLET_CALL_INDEX required"))?
            .parse::<CallIndex>()
            .wrap_err("Invalid ETH_WALLET_CALL_INDEX")?;

        let remark_call = match env::var("REMARK_CALL_INDEX") {
            Ok(v) => v
                .parse::<CallIndex>()
                .wrap_err("Invalid REMARK_CALL_INDEX")?,
            Err(_) => CallIndex::SYSTEM_REMARK,
        };

        let ss58_format = match env::var("SS58_FORMAT") {
            Ok(v) => v
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|f| *f <= MAX_SS58_FORMAT)
                .ok_or_else(|| eyre!("Invalid SS58_FORMAT: {}", v))?,
            Err(_) => DEFAULT_SS58_FORMAT,
        };

        let eth_private_key = match env::var("ETH_PRIVATE_KEY") {
            Ok(v) if !v.trim().is_empty() => {
                Some(v.parse::<SecretKey>().wrap_err("Invalid ETH_PRIVATE_KEY")?)
            }
            _ => None,
        };

        Ok(Self {
            rpc_url,
            eth_private_key,

            eth_wallet_call,
            remark_call,

            ss58_format,
            remark_message: env::var("REMARK_MESSAGE")
                .unwrap_or_else(|_| "hello world".to_string()),

            rpc_timeout_ms: env::var("RPC_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
            dry_run: env::var("DRY_RUN")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// The private key, for callers that sign locally
    pub fn require_private_key(&self) -> Result<&SecretKey> {
        self.eth_private_key
            .as_ref()
            .ok_or_else(|| eyre!("ETH_PRIVATE_KEY required"))
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

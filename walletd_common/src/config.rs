use std::time::Duration;
use thiserror::Error;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// walletd listens locally by default
pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 8070;
pub const DEFAULT_RPC_PASSWORD: &str = "test";
pub const DEFAULT_REQUEST_ID: &str = "walletd-tools";
pub const RPC_PATH: &str = "/json_rpc";

pub const DEFAULT_FEE: u64 = 10; // minimum fee accepted by the network
pub const DEFAULT_ANONYMITY: u32 = 5;

// standard (non integrated) address length in base58
pub const ADDRESS_LENGTH: usize = 99;
pub const ADDRESS_PLACEHOLDER: &str = "Fill me in!";

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid address length: expected {} characters but got {}", ADDRESS_LENGTH, _0)]
    InvalidAddressLength(usize),
    #[error("Invalid character '{}' in address", _0)]
    InvalidAddressCharacter(char),
    #[error("RPC host cannot be empty")]
    EmptyHost,
    #[error("RPC port cannot be 0")]
    InvalidPort,
    #[error("Base backoff delay must be greater than 0")]
    ZeroBaseDelay,
    #[error("Maximum backoff delay ({:?}) is lower than the base delay ({:?})", _0, _1)]
    MaxDelayBelowBase(Duration, Duration),
    #[error("A transaction cannot have both extra data and a payment ID")]
    ExtraWithPaymentId,
    #[error("A transaction needs at least one transfer")]
    NoTransfers
}

// Check that the address looks like a standard wallet address before sending anything to it
pub fn validate_address(address: &str) -> Result<(), ConfigError> {
    let len = address.chars().count();
    if len != ADDRESS_LENGTH {
        return Err(ConfigError::InvalidAddressLength(len))
    }

    if let Some(c) = address.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(ConfigError::InvalidAddressCharacter(c))
    }

    Ok(())
}

/// Connection settings for the walletd JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub request_id: String,
    /// No timeout when unset: a hung connection blocks forever
    pub timeout: Option<Duration>
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_owned(),
            port: DEFAULT_RPC_PORT,
            password: DEFAULT_RPC_PASSWORD.to_owned(),
            request_id: DEFAULT_REQUEST_ID.to_owned(),
            timeout: None
        }
    }
}

impl RpcConfig {
    pub fn target(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, RPC_PATH)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost)
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort)
        }

        Ok(())
    }
}

#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct RpcArgs {
    /// walletd RPC host
    #[clap(long, default_value_t = String::from(DEFAULT_RPC_HOST))]
    pub host: String,
    /// walletd RPC port
    #[clap(long, default_value_t = DEFAULT_RPC_PORT)]
    pub port: u16,
    /// Password set with --rpc-password when starting walletd
    #[clap(long, default_value_t = String::from(DEFAULT_RPC_PASSWORD))]
    pub rpc_password: String,
    /// Identifier sent in every JSON-RPC request
    #[clap(long, default_value_t = String::from(DEFAULT_REQUEST_ID))]
    pub request_id: String,
    /// Request timeout in milliseconds, disabled if not set
    #[clap(long)]
    pub timeout_ms: Option<u64>
}

#[cfg(feature = "clap")]
impl From<RpcArgs> for RpcConfig {
    fn from(args: RpcArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            password: args.rpc_password,
            request_id: args.request_id,
            timeout: args.timeout_ms.map(Duration::from_millis)
        }
    }
}

// Config pointing at a local port that was just released, so nothing listens on it
#[cfg(test)]
pub(crate) fn unreachable_rpc_config() -> RpcConfig {
    let listener = std::net::TcpListener::bind((DEFAULT_RPC_HOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    RpcConfig {
        port,
        ..Default::default()
    }
}

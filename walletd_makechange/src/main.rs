use std::time::Duration;

use anyhow::{Result, Context};
use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use walletd_common::{
    config::{
        validate_address,
        RpcArgs,
        RpcConfig,
        VERSION,
        ADDRESS_PLACEHOLDER,
        DEFAULT_FEE,
        DEFAULT_ANONYMITY
    },
    dispatcher::{Backoff, ChangeGenerator, Dispatcher},
    json_rpc::JsonRPCClient,
    logger::{level_from_debug, setup_logger},
    get_cli_styles
};

/// Rapidly sends random amounts from your wallet back to you, to generate
/// change outputs on a new network.
///
/// Open the wallet with walletd first:
/// walletd -w yourwalletfilename -p yourwalletpassword --rpc-password test
#[derive(Parser)]
#[clap(version = VERSION, about = "walletd change generator", styles = get_cli_styles())]
pub struct Config {
    #[clap(flatten)]
    rpc: RpcArgs,
    /// Your own wallet address, funds are sent to it over and over
    #[clap(short, long, default_value_t = String::from(ADDRESS_PLACEHOLDER))]
    address: String,
    /// Fee paid for each transaction
    #[clap(long, default_value_t = DEFAULT_FEE)]
    fee: u64,
    /// Anonymity (mixin) level for each transaction
    #[clap(long, default_value_t = DEFAULT_ANONYMITY)]
    anonymity: u32,
    /// Delay in milliseconds before retrying after the first failure
    #[clap(long, default_value_t = 1)]
    base_delay_ms: u64,
    /// Upper bound of the retry delay in milliseconds, unbounded if not set
    #[clap(long)]
    max_delay_ms: Option<u64>,
    /// Enable the debug mode
    #[clap(short, long)]
    debug: bool,
    /// Disable the log file
    #[clap(short = 'f', long)]
    disable_file_logging: bool,
    /// Log filename
    #[clap(short = 'l', long, default_value_t = String::from("walletd-makechange.log"))]
    filename_log: String
}

impl Config {
    fn build_backoff(&self) -> Result<Backoff> {
        let backoff = Backoff::new(
            Duration::from_millis(self.base_delay_ms),
            self.max_delay_ms.map(Duration::from_millis)
        ).context("Invalid backoff configuration")?;
        Ok(backoff)
    }
}

fn main() -> Result<()> {
    let config: Config = Config::parse();
    setup_logger(level_from_debug(config.debug), &config.filename_log, config.disable_file_logging)?;

    // sending to a wrong address would drain the wallet quickly
    if let Err(e) = validate_address(&config.address) {
        error!("Please fill in your address and re-run the tool.");
        return Err(e).context("Invalid wallet address");
    }

    let backoff = config.build_backoff()?;
    let rpc: RpcConfig = config.rpc.into();
    rpc.validate().context("Invalid RPC configuration")?;

    let client = JsonRPCClient::new(&rpc).context("Error while creating the RPC client")?;
    info!("Sending change transactions to {} through {}", config.address, client.get_target());

    let mut generator = ChangeGenerator::new(config.address, config.fee, config.anonymity, StdRng::from_entropy());
    let mut dispatcher = Dispatcher::new(client, backoff);
    match dispatcher.run(&mut generator) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        Config::try_parse_from([&["walletd_makechange"][..], args].concat()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.address, ADDRESS_PLACEHOLDER);
        assert!(validate_address(&config.address).is_err());
        assert_eq!(config.fee, DEFAULT_FEE);
        assert_eq!(config.anonymity, DEFAULT_ANONYMITY);

        let backoff = config.build_backoff().unwrap();
        assert_eq!(backoff.base(), Duration::from_millis(1));
        assert!(backoff.max().is_none());

        let rpc: RpcConfig = config.rpc.into();
        assert_eq!(rpc, RpcConfig::default());
    }

    #[test]
    fn test_backoff_flags() {
        let backoff = config(&["--base-delay-ms", "5", "--max-delay-ms", "100"]).build_backoff().unwrap();
        assert_eq!(backoff.base(), Duration::from_millis(5));
        assert_eq!(backoff.max(), Some(Duration::from_millis(100)));

        assert!(config(&["--base-delay-ms", "0"]).build_backoff().is_err());
        assert!(config(&["--base-delay-ms", "10", "--max-delay-ms", "5"]).build_backoff().is_err());
    }

    #[test]
    fn test_rpc_flags() {
        let rpc: RpcConfig = config(&["--port", "9000", "--rpc-password", "secret", "--timeout-ms", "250"]).rpc.into();
        assert_eq!(rpc.target(), "http://127.0.0.1:9000/json_rpc");
        assert_eq!(rpc.password, "secret");
        assert_eq!(rpc.timeout, Some(Duration::from_millis(250)));
    }
}

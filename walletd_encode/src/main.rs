use std::path::PathBuf;

use anyhow::{Result, Context};
use clap::Parser;
use log::{error, info, warn};
use walletd_common::{
    api::{SendTransactionParams, Transfer},
    config::{validate_address, RpcArgs, RpcConfig, VERSION, DEFAULT_FEE, DEFAULT_ANONYMITY},
    dispatcher::{Endpoint, FailureReason},
    extra::{encode_extra, load_content},
    json_rpc::JsonRPCClient,
    logger::{level_from_debug, setup_logger},
    send::{send_transaction, SentTransaction},
    get_cli_styles
};

const DEFAULT_RECIPIENT: &str = "TRTLv3xYqUdAy4K8viYjNnMj21NLohHbf9ut2Cczxyh96d74TzxNgdB3aZbb9U2ZJ1DVmVpbDwzH77821o9ciNYQVaSt3V6bu7R";

#[derive(Parser)]
#[clap(version = VERSION, about = "Send a transaction carrying ASCII art in its extra field", styles = get_cli_styles())]
pub struct Config {
    #[clap(flatten)]
    rpc: RpcArgs,
    /// Recipient address
    #[clap(short, long, default_value_t = String::from(DEFAULT_RECIPIENT))]
    address: String,
    /// Amount to send in atomic units
    #[clap(long, default_value_t = 1)]
    amount: u64,
    /// Message attached to the transfer
    #[clap(short, long)]
    message: Option<String>,
    /// Fee paid for the transaction
    #[clap(long, default_value_t = DEFAULT_FEE)]
    fee: u64,
    /// Anonymity (mixin) level
    #[clap(long, default_value_t = DEFAULT_ANONYMITY)]
    anonymity: u32,
    /// File to embed instead of the built-in art
    #[clap(short, long)]
    content_file: Option<PathBuf>,
    /// Payment ID, cannot be used together with extra data
    #[clap(long)]
    payment_id: Option<String>,
    /// Wallet address receiving the change
    #[clap(long)]
    change_address: Option<String>,
    /// Wallet address to spend from, can be repeated (all addresses if not set)
    #[clap(long = "source-address")]
    source_addresses: Vec<String>,
    /// Height or timestamp until which the outputs stay locked
    #[clap(long)]
    unlock_time: Option<u64>,
    /// Enable the debug mode
    #[clap(short, long)]
    debug: bool,
    /// Disable the log file
    #[clap(short = 'f', long)]
    disable_file_logging: bool,
    /// Log filename
    #[clap(short = 'l', long, default_value_t = String::from("walletd-encode.log"))]
    filename_log: String
}

impl Config {
    fn build_params(&self, content: &[u8]) -> Result<SendTransactionParams> {
        validate_address(&self.address).context("Invalid recipient address")?;
        if let Some(address) = &self.change_address {
            validate_address(address).context("Invalid change address")?;
        }
        for address in &self.source_addresses {
            validate_address(address).context("Invalid source address")?;
        }

        let mut transfer = Transfer::new(self.address.clone(), self.amount);
        transfer.message = self.message.clone();

        let mut params = SendTransactionParams::new(vec![transfer], self.fee, self.anonymity);
        params.extra = Some(encode_extra(content));
        params.payment_id = self.payment_id.clone();
        params.change_address = self.change_address.clone();
        params.addresses = self.source_addresses.clone();
        params.unlock_time = self.unlock_time;
        params.validate().context("Invalid transaction")?;

        Ok(params)
    }
}

// Any failure ends up as an error so the process exits with a non-zero code
fn send<E: Endpoint>(endpoint: &E, params: &SendTransactionParams) -> Result<()> {
    match send_transaction(endpoint, params) {
        Ok(SentTransaction::Known(result)) => {
            info!("Transaction hash: {}", result.transaction_hash);
            match result.transaction_secret_key {
                Some(key) => info!("Transaction secret key: {}", key),
                None => warn!("walletd did not return the transaction secret key")
            }
        },
        Ok(SentTransaction::Raw(result)) => info!("{}", result),
        Err(reason @ FailureReason::Transport(_)) => {
            error!("Doesn't seem like walletd is running.");
            return Err(reason.into_error()).context("walletd is unreachable");
        },
        Err(reason @ FailureReason::Protocol(_)) => {
            error!("Failed to talk to server: {}", reason);
            return Err(reason.into_error()).context("walletd rejected the transaction");
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let config: Config = Config::parse();
    setup_logger(level_from_debug(config.debug), &config.filename_log, config.disable_file_logging)?;

    let content = load_content(config.content_file.as_deref())?;
    let params = config.build_params(&content)?;
    let rpc: RpcConfig = config.rpc.into();
    rpc.validate().context("Invalid RPC configuration")?;

    let client = JsonRPCClient::new(&rpc).context("Error while creating the RPC client")?;
    info!("Sending {} bytes of extra data to {}", content.len(), client.get_target());
    send(&client, &params)
}

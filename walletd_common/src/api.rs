use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub const SEND_TRANSACTION: &str = "sendTransaction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub address: String,
    pub amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>
}

impl Transfer {
    pub fn new(address: String, amount: u64) -> Self {
        Self {
            address,
            amount,
            message: None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionParams {
    pub transfers: Vec<Transfer>,
    pub fee: u64,
    pub anonymity: u32,
    // hex encoded bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_address: Option<String>,
    // source addresses to spend from, all wallet addresses when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_time: Option<u64>
}

impl SendTransactionParams {
    pub fn new(transfers: Vec<Transfer>, fee: u64, anonymity: u32) -> Self {
        Self {
            transfers,
            fee,
            anonymity,
            ..Default::default()
        }
    }

    // walletd refuses requests having both extra and paymentId set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transfers.is_empty() {
            return Err(ConfigError::NoTransfers)
        }

        if self.extra.is_some() && self.payment_id.is_some() {
            return Err(ConfigError::ExtraWithPaymentId)
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResult {
    pub transaction_hash: String,
    #[serde(default)]
    pub transaction_secret_key: Option<String>
}

use log::warn;
use serde_json::{json, Value};

use crate::{
    api::{SendTransactionParams, SendTransactionResult, SEND_TRANSACTION},
    dispatcher::{classify, Endpoint, FailureReason, RequestSpec, ResponseOutcome}
};

/// Result of a single `sendTransaction` that walletd accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum SentTransaction {
    Known(SendTransactionResult),
    // accepted, but the result does not have the expected shape
    Raw(Value),
}

// Send once without retrying. Only an error key or an unreachable walletd is a failure.
pub fn send_transaction<E: Endpoint>(endpoint: &E, params: &SendTransactionParams) -> Result<SentTransaction, FailureReason> {
    let request = RequestSpec::new(SEND_TRANSACTION, json!(params));
    match endpoint.attempt(&request) {
        ResponseOutcome::Success(result) => Ok(match serde_json::from_value(result.clone()) {
            Ok(result) => SentTransaction::Known(result),
            Err(e) => {
                warn!("Unexpected result from walletd: {}", e);
                SentTransaction::Raw(result)
            }
        }),
        ResponseOutcome::Failure(reason) => Err(reason),
    }
}

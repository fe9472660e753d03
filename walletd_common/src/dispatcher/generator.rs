use rand::Rng;
use serde_json::json;

use crate::api::{SendTransactionParams, Transfer, SEND_TRANSACTION};
use super::RequestSpec;

// amounts escalate 1_000, 10_000, ... up to 10_000_000_000 then start over
pub const INITIAL_MAGNITUDE: u64 = 1_000;
pub const MAGNITUDE_FACTOR: u64 = 10;
pub const MAGNITUDE_CEILING: u64 = 100_000_000_000;
// each amount is picked in [magnitude, magnitude + AMOUNT_SPREAD)
pub const AMOUNT_SPREAD: u64 = 10_000;

/// Source of requests for the dispatcher.
pub trait RequestGenerator {
    fn next_request(&mut self) -> RequestSpec;

    // called after a failure, the next request starts a new sequence
    fn restart(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Escalating(u64),
    Resetting,
}

/// Generates `sendTransaction` requests sending a random amount back to
/// the wallet's own address, escalating the amount magnitude by ten at each
/// request until a failure happens or the ceiling is reached.
pub struct ChangeGenerator<R: Rng> {
    address: String,
    fee: u64,
    anonymity: u32,
    phase: Phase,
    rng: R,
}

impl<R: Rng> ChangeGenerator<R> {
    pub fn new(address: String, fee: u64, anonymity: u32, rng: R) -> Self {
        Self {
            address,
            fee,
            anonymity,
            phase: Phase::Escalating(INITIAL_MAGNITUDE),
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    // Magnitude to use for this request, and move to the next phase
    fn next_magnitude(&mut self) -> u64 {
        let magnitude = match self.phase {
            Phase::Escalating(magnitude) => magnitude,
            Phase::Resetting => INITIAL_MAGNITUDE,
        };

        let next = magnitude.saturating_mul(MAGNITUDE_FACTOR);
        self.phase = if next < MAGNITUDE_CEILING {
            Phase::Escalating(next)
        } else {
            Phase::Escalating(INITIAL_MAGNITUDE)
        };

        magnitude
    }

    pub fn build_params(&self, amount: u64) -> SendTransactionParams {
        SendTransactionParams::new(
            vec![Transfer::new(self.address.clone(), amount)],
            self.fee,
            self.anonymity
        )
    }
}

impl<R: Rng> RequestGenerator for ChangeGenerator<R> {
    fn next_request(&mut self) -> RequestSpec {
        let magnitude = self.next_magnitude();
        let amount = self.rng.gen_range(magnitude..magnitude + AMOUNT_SPREAD);
        RequestSpec::new(SEND_TRANSACTION, json!(self.build_params(amount)))
    }

    fn restart(&mut self) {
        self.phase = Phase::Resetting;
    }
}

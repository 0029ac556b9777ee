//! Transaction Chain Verification
//!
//! Every device chain can be checked from the device's public key and id
//! alone. For a chain ordered by `counter_value`:
//!
//! - Counters run 0, 1, 2, … with no gaps or repeats
//! - Transaction 0 carries the anchor: a signature over the raw device id
//!   that verifies under the device key
//! - Every later transaction's `previous_signature` equals the `signature` of
//!   the transaction before it
//! - Every `signature` verifies over its own `data`
//!
//! Verification is linear in the chain length and reports the first break.

use std::fmt;

use thiserror::Error;

use chainsign_core::{Device, Transaction};

use crate::suite::AlgorithmSuite;

/// Errors that can occur in chain verification.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Counter gap: expected {expected}, got {actual}")]
    CounterGap { expected: u64, actual: u64 },

    #[error("Transaction belongs to device {actual}, not {expected}")]
    ForeignTransaction { expected: String, actual: String },

    #[error("Anchor signature does not verify against the device key")]
    InvalidAnchor,

    #[error("Broken chain link: previous_signature does not match predecessor")]
    BrokenLink,

    #[error("Signature does not verify over transaction data")]
    InvalidSignature,

    #[error("Verification failed: {reason}")]
    Crypto { reason: String },
}

impl ChainError {
    fn error_type(&self) -> &'static str {
        match self {
            ChainError::CounterGap { .. } => "counter_gap",
            ChainError::ForeignTransaction { .. } => "foreign_transaction",
            ChainError::InvalidAnchor => "invalid_anchor",
            ChainError::BrokenLink => "broken_link",
            ChainError::InvalidSignature => "invalid_signature",
            ChainError::Crypto { .. } => "crypto_error",
        }
    }
}

/// Result of chain verification.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyResult {
    /// Chain is valid
    Ok { length: usize },
    /// Chain break detected at specific position
    Error {
        error_type: String,
        index: usize,
        detail: String,
    },
}

impl VerifyResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, VerifyResult::Ok { .. })
    }

    fn failure(index: usize, error: ChainError) -> Self {
        VerifyResult::Error {
            error_type: error.error_type().to_string(),
            index,
            detail: error.to_string(),
        }
    }
}

impl fmt::Display for VerifyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyResult::Ok { length } => write!(f, "ok ({} transactions)", length),
            VerifyResult::Error {
                error_type, index, ..
            } => {
                write!(f, "error: {} at index {}", error_type, index)
            }
        }
    }
}

/// Verifies the chain of one device.
///
/// `transactions` may be in any order; they are sorted by counter first. An
/// empty chain is valid.
pub fn verify_device_chain(
    suite: &AlgorithmSuite,
    device: &Device,
    transactions: &[Transaction],
) -> VerifyResult {
    let mut chain: Vec<&Transaction> = transactions.iter().collect();
    chain.sort_by_key(|tx| tx.counter_value);

    for (i, tx) in chain.iter().enumerate() {
        if tx.device_id != device.id {
            return VerifyResult::failure(
                i,
                ChainError::ForeignTransaction {
                    expected: device.id.clone(),
                    actual: tx.device_id.clone(),
                },
            );
        }
        if let Err(e) = verify_link(suite, device, &chain, i) {
            return VerifyResult::failure(i, e);
        }
    }

    VerifyResult::Ok {
        length: chain.len(),
    }
}

fn verify_link(
    suite: &AlgorithmSuite,
    device: &Device,
    chain: &[&Transaction],
    i: usize,
) -> Result<(), ChainError> {
    let tx = chain[i];
    let expected = i as u64;
    if tx.counter_value != expected {
        return Err(ChainError::CounterGap {
            expected,
            actual: tx.counter_value,
        });
    }

    let verifies = |payload: &[u8], signature: &[u8]| {
        suite
            .verify(&device.public_key, payload, signature)
            .map_err(|e| ChainError::Crypto {
                reason: e.to_string(),
            })
    };

    if i == 0 {
        if !verifies(device.id.as_bytes(), tx.previous_signature.as_slice())? {
            return Err(ChainError::InvalidAnchor);
        }
    } else if tx.previous_signature != chain[i - 1].signature {
        return Err(ChainError::BrokenLink);
    }

    if !verifies(tx.data.as_bytes(), tx.signature.as_slice())? {
        return Err(ChainError::InvalidSignature);
    }

    Ok(())
}

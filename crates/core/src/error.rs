//! Core error types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Core error type for Chainsign.
///
/// Every failure of the registry, the ledger and the signing path surfaces as
/// one of these variants. None of them terminate the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed request field
    #[error("Invalid field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// Algorithm string outside the supported families
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    #[error("Transaction not found: {transaction_id}")]
    TransactionNotFound { transaction_id: String },

    #[error("Device already exists: {device_id}")]
    DeviceAlreadyExists { device_id: String },

    #[error("Transaction already exists: {transaction_id}")]
    TransactionAlreadyExists { transaction_id: String },

    /// Key material could not be encoded or decoded
    #[error("Key codec error: {0}")]
    KeyCodec(String),

    /// The underlying cryptographic operation failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Registry and ledger disagree about a device chain
    #[error("Chain inconsistency for device {device_id}: {reason}")]
    ChainInconsistency { device_id: String, reason: String },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Caller-facing category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    KeyCodec,
    Signing,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::KeyCodec => "key_codec",
            ErrorKind::Signing => "signing",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] failure.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Category used by outer layers to pick a status code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } | Error::UnsupportedAlgorithm(_) => ErrorKind::Validation,
            Error::DeviceNotFound { .. } | Error::TransactionNotFound { .. } => {
                ErrorKind::NotFound
            }
            Error::DeviceAlreadyExists { .. } | Error::TransactionAlreadyExists { .. } => {
                ErrorKind::Conflict
            }
            Error::KeyCodec(_) => ErrorKind::KeyCodec,
            Error::Signing(_) => ErrorKind::Signing,
            Error::ChainInconsistency { .. } | Error::LockPoisoned(_) | Error::Config(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Errors raised by key handling and signature operations.

use thiserror::Error;

use chainsign_core::SignatureAlgorithm;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key generation failed for {algorithm}: {reason}")]
    KeyGeneration {
        algorithm: SignatureAlgorithm,
        reason: String,
    },

    #[error("Key codec error: {reason}")]
    KeyCodec { reason: String },

    #[error("Key family mismatch: expected {expected}, got {actual}")]
    KeyMismatch {
        expected: SignatureAlgorithm,
        actual: SignatureAlgorithm,
    },

    #[error("Signing failed: {reason}")]
    Signing { reason: String },
}

impl CryptoError {
    pub(crate) fn codec(reason: impl ToString) -> Self {
        CryptoError::KeyCodec {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn signing(reason: impl ToString) -> Self {
        CryptoError::Signing {
            reason: reason.to_string(),
        }
    }
}

impl From<CryptoError> for chainsign_core::Error {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyCodec { .. } | CryptoError::KeyMismatch { .. } => {
                chainsign_core::Error::KeyCodec(err.to_string())
            }
            CryptoError::KeyGeneration { .. } | CryptoError::Signing { .. } => {
                chainsign_core::Error::Signing(err.to_string())
            }
        }
    }
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

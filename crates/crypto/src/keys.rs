//! Key pairs and the capability traits every algorithm family implements.

use std::fmt;

use zeroize::Zeroizing;

use chainsign_core::SignatureAlgorithm;

use crate::error::{CryptoError, CryptoResult};

/// An in-memory key pair of one algorithm family.
#[derive(Clone)]
pub enum KeyPair {
    Rsa {
        private: rsa::RsaPrivateKey,
        public: rsa::RsaPublicKey,
    },
    Ecc {
        private: p384::SecretKey,
        public: p384::PublicKey,
    },
}

impl KeyPair {
    /// Family this key pair belongs to.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa { .. } => SignatureAlgorithm::Rsa,
            KeyPair::Ecc { .. } => SignatureAlgorithm::Ecc,
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

/// Transportable form of a key pair.
///
/// Both halves are PEM documents; the private half is wiped on drop.
#[derive(Clone)]
pub struct EncodedKeyPair {
    pub public: Vec<u8>,
    pub private: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for EncodedKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKeyPair")
            .field("public_len", &self.public.len())
            .field("private", &"<redacted>")
            .finish()
    }
}

/// Produces fresh key pairs.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> CryptoResult<KeyPair>;
}

/// Encodes key pairs to bytes and back.
pub trait KeyMarshaler: Send + Sync {
    fn encode(&self, key_pair: &KeyPair) -> CryptoResult<EncodedKeyPair>;

    /// Rebuild the full key pair from the encoded private key alone.
    fn decode(&self, private_key: &[u8]) -> CryptoResult<KeyPair>;
}

/// Produces signatures from encoded private key material.
pub trait Signer: Send + Sync {
    fn sign(&self, private_key: &[u8], payload: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// Checks signatures against an encoded public key.
///
/// Returns `Ok(false)` for a well-formed key and a bad or malformed signature;
/// an unreadable key is an error.
pub trait Verifier: Send + Sync {
    fn verify(&self, public_key: &[u8], payload: &[u8], signature: &[u8]) -> CryptoResult<bool>;
}

/// PEM documents are ASCII; anything else is a codec failure.
pub(crate) fn pem_str(bytes: &[u8]) -> CryptoResult<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| CryptoError::codec(format!("key is not PEM text: {}", e)))
}

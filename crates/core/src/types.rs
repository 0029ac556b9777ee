//! Core types: signing devices, chained transactions and the algorithm families.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::Error;

/// Algorithm family a device is bound to.
///
/// The set is closed: a new family is a new variant here plus one arm in the
/// crypto crate's suite dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSASSA-PSS over SHA-256
    #[serde(rename = "RSA")]
    Rsa,
    /// ECDSA on P-384
    #[serde(rename = "ECC")]
    Ecc,
}

impl SignatureAlgorithm {
    /// Wire name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Rsa => "RSA",
            SignatureAlgorithm::Ecc => "ECC",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RSA" => Ok(SignatureAlgorithm::Rsa),
            "ECC" => Ok(SignatureAlgorithm::Ecc),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// A signature device bound to one key pair.
///
/// Everything except `signature_counter` is fixed at creation. The private
/// key is held only in memory and is never serialized.
#[derive(Clone, Serialize, Deserialize)]
pub struct Device {
    /// Caller-supplied unique identifier
    pub id: String,
    /// Optional human readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Algorithm family of the bound key pair
    pub algorithm: SignatureAlgorithm,
    /// PEM-encoded public key
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    /// Stable fingerprint of the public key
    pub public_key_id: String,
    /// PEM-encoded private key
    #[serde(skip)]
    pub key_material: Zeroizing<Vec<u8>>,
    /// Number of transactions signed so far
    pub signature_counter: u64,
    /// Creation time (Unix epoch milliseconds)
    pub created_at: u64,
}

impl Device {
    /// Build a fresh device with its counter at zero.
    pub fn new(
        id: impl Into<String>,
        label: Option<String>,
        algorithm: SignatureAlgorithm,
        public_key: Vec<u8>,
        key_material: Zeroizing<Vec<u8>>,
    ) -> Self {
        let public_key_id = public_key_id(&public_key);
        Self {
            id: id.into(),
            label,
            algorithm,
            public_key,
            public_key_id,
            key_material,
            signature_counter: 0,
            created_at: current_timestamp(),
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("algorithm", &self.algorithm)
            .field("public_key_id", &self.public_key_id)
            .field("key_material", &"<redacted>")
            .field("signature_counter", &self.signature_counter)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// One signed entry in a device chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Generated unique identifier
    pub id: String,
    /// Device that signed this transaction
    pub device_id: String,
    /// Position in the device chain, starting at 0
    pub counter_value: u64,
    /// Caller payload
    pub data: String,
    /// Anchor signature for position 0, otherwise the predecessor's signature
    #[serde(with = "base64_bytes")]
    pub previous_signature: Vec<u8>,
    /// Signature over `data`
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
    /// Creation time (Unix epoch milliseconds)
    pub created_at: u64,
}

impl Transaction {
    /// Composed chain string `"{counter}_{data}_{previous_signature}"`.
    pub fn signed_data(&self) -> String {
        compose_signed_data(self.counter_value, &self.data, &self.previous_signature)
    }
}

/// Render the chain string for a counter, payload and previous signature.
///
/// The previous signature is rendered as standard base64.
pub fn compose_signed_data(counter_value: u64, data: &str, previous_signature: &[u8]) -> String {
    format!(
        "{}_{}_{}",
        counter_value,
        data,
        encode_base64(previous_signature)
    )
}

/// Standard base64 encoding used for every signature leaving the core.
pub fn encode_base64(bytes: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Generates a stable public key identifier: first 16 bytes of the BLAKE3 hash, hex encoded.
pub fn public_key_id(public_key: &[u8]) -> String {
    let hash = blake3::hash(public_key);
    hex::encode(&hash.as_bytes()[..16])
}

/// Get current timestamp in milliseconds.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

mod base64_bytes {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

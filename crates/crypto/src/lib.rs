//! Cryptographic primitives for the Chainsign signing service.
//!
//! This crate provides the algorithm-polymorphic key handling that signing
//! devices are built on, plus verification of whole device chains.
//!
//! # Core Capabilities
//!
//! - **Key Generation**: fresh key pairs per algorithm family
//! - **Key Marshaling**: PEM encoding of key pairs and decoding from the private half
//! - **Digital Signatures**: randomized signing and verification
//! - **Chain Verification**: anchor, linkage and counter checks for a device chain
//!
//! # Supported Algorithms
//!
//! - **RSA**: RSASSA-PSS over SHA-256, PKCS#1 private keys
//! - **ECC**: ECDSA on P-384, SEC1 private keys
//!
//! Families are selected through [`AlgorithmSuite`]; nothing outside
//! [`suite`] matches on the algorithm.
//!
//! # Security Notes
//!
//! Key material lives in process memory only and is zeroized on drop. Key
//! sizes are configuration, not a security contract.

pub mod chain;
pub mod ecc;
pub mod error;
pub mod keys;
pub mod rsa_pss;
pub mod suite;

pub use chain::{verify_device_chain, ChainError, VerifyResult};
pub use ecc::{EccGenerator, EccMarshaler, EcdsaSigner};
pub use error::{CryptoError, CryptoResult};
pub use keys::{EncodedKeyPair, KeyGenerator, KeyMarshaler, KeyPair, Signer, Verifier};
pub use rsa_pss::{RsaGenerator, RsaMarshaler, RsaPssSigner};
pub use suite::{AlgorithmSuite, SuiteParams, SuiteRegistry};

//! Dispatch from an algorithm family to its implementations.
//!
//! This is the only place that matches on [`SignatureAlgorithm`]; every other
//! component goes through an [`AlgorithmSuite`].

use chainsign_core::SignatureAlgorithm;

use crate::ecc::{EccGenerator, EccMarshaler, EcdsaSigner};
use crate::error::CryptoResult;
use crate::keys::{EncodedKeyPair, KeyGenerator, KeyMarshaler, KeyPair, Signer, Verifier};
use crate::rsa_pss::{RsaGenerator, RsaMarshaler, RsaPssSigner};

/// Family-specific parameters for building suites.
#[derive(Debug, Clone, Copy)]
pub struct SuiteParams {
    pub rsa_key_bits: usize,
}

impl Default for SuiteParams {
    fn default() -> Self {
        Self { rsa_key_bits: 2048 }
    }
}

impl From<&chainsign_core::CryptoConfig> for SuiteParams {
    fn from(config: &chainsign_core::CryptoConfig) -> Self {
        Self {
            rsa_key_bits: config.rsa_key_bits,
        }
    }
}

/// The full capability set of one algorithm family.
pub struct AlgorithmSuite {
    algorithm: SignatureAlgorithm,
    generator: Box<dyn KeyGenerator>,
    marshaler: Box<dyn KeyMarshaler>,
    signer: Box<dyn Signer>,
    verifier: Box<dyn Verifier>,
}

impl AlgorithmSuite {
    /// Build the suite for a family.
    pub fn for_algorithm(algorithm: SignatureAlgorithm, params: SuiteParams) -> Self {
        match algorithm {
            SignatureAlgorithm::Rsa => Self {
                algorithm,
                generator: Box::new(RsaGenerator::new(params.rsa_key_bits)),
                marshaler: Box::new(RsaMarshaler),
                signer: Box::new(RsaPssSigner),
                verifier: Box::new(RsaPssSigner),
            },
            SignatureAlgorithm::Ecc => Self {
                algorithm,
                generator: Box::new(EccGenerator),
                marshaler: Box::new(EccMarshaler),
                signer: Box::new(EcdsaSigner),
                verifier: Box::new(EcdsaSigner),
            },
        }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn generate(&self) -> CryptoResult<KeyPair> {
        self.generator.generate()
    }

    pub fn encode(&self, key_pair: &KeyPair) -> CryptoResult<EncodedKeyPair> {
        self.marshaler.encode(key_pair)
    }

    pub fn decode(&self, private_key: &[u8]) -> CryptoResult<KeyPair> {
        self.marshaler.decode(private_key)
    }

    pub fn sign(&self, private_key: &[u8], payload: &[u8]) -> CryptoResult<Vec<u8>> {
        self.signer.sign(private_key, payload)
    }

    pub fn verify(&self, public_key: &[u8], payload: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        self.verifier.verify(public_key, payload, signature)
    }

    /// Generate and encode a key pair in one step.
    pub fn generate_encoded(&self) -> CryptoResult<EncodedKeyPair> {
        let key_pair = self.generate()?;
        self.encode(&key_pair)
    }
}

/// Holds one suite per supported family.
pub struct SuiteRegistry {
    rsa: AlgorithmSuite,
    ecc: AlgorithmSuite,
}

impl SuiteRegistry {
    pub fn new(params: SuiteParams) -> Self {
        Self {
            rsa: AlgorithmSuite::for_algorithm(SignatureAlgorithm::Rsa, params),
            ecc: AlgorithmSuite::for_algorithm(SignatureAlgorithm::Ecc, params),
        }
    }

    pub fn get(&self, algorithm: SignatureAlgorithm) -> &AlgorithmSuite {
        match algorithm {
            SignatureAlgorithm::Rsa => &self.rsa,
            SignatureAlgorithm::Ecc => &self.ecc,
        }
    }
}

impl Default for SuiteRegistry {
    fn default() -> Self {
        Self::new(SuiteParams::default())
    }
}

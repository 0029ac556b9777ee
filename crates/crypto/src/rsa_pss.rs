//! RSA family: key generation, PKCS#1/SPKI PEM marshaling and RSASSA-PSS.
//!
//! Signatures use PSS padding over a SHA-256 digest of the payload with a
//! fresh random salt, so two signatures of the same payload differ.

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::pss::{BlindedSigningKey, Signature, VerifyingKey};
use rsa::signature::{RandomizedSigner as _, SignatureEncoding as _, Verifier as _};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use chainsign_core::SignatureAlgorithm;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{pem_str, EncodedKeyPair, KeyGenerator, KeyMarshaler, KeyPair, Signer, Verifier};

/// Generates RSA key pairs of a fixed modulus size.
#[derive(Debug, Clone, Copy)]
pub struct RsaGenerator {
    bits: usize,
}

impl RsaGenerator {
    pub fn new(bits: usize) -> Self {
        Self { bits }
    }
}

impl KeyGenerator for RsaGenerator {
    fn generate(&self) -> CryptoResult<KeyPair> {
        debug!(bits = self.bits, "Generating RSA key pair");
        let private =
            RsaPrivateKey::new(&mut OsRng, self.bits).map_err(|e| CryptoError::KeyGeneration {
                algorithm: SignatureAlgorithm::Rsa,
                reason: e.to_string(),
            })?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa { private, public })
    }
}

/// PKCS#1 PEM for the private key, SPKI PEM for the public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaMarshaler;

impl RsaMarshaler {
    pub fn new() -> Self {
        Self
    }

    fn decode_private(private_key: &[u8]) -> CryptoResult<RsaPrivateKey> {
        RsaPrivateKey::from_pkcs1_pem(pem_str(private_key)?).map_err(CryptoError::codec)
    }
}

impl KeyMarshaler for RsaMarshaler {
    fn encode(&self, key_pair: &KeyPair) -> CryptoResult<EncodedKeyPair> {
        let (private, public) = match key_pair {
            KeyPair::Rsa { private, public } => (private, public),
            other => {
                return Err(CryptoError::KeyMismatch {
                    expected: SignatureAlgorithm::Rsa,
                    actual: other.algorithm(),
                })
            }
        };

        let private_pem = private
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(CryptoError::codec)?;
        let public_pem = public
            .to_public_key_pem(LineEnding::LF)
            .map_err(CryptoError::codec)?;

        Ok(EncodedKeyPair {
            public: public_pem.into_bytes(),
            private: Zeroizing::new(private_pem.as_bytes().to_vec()),
        })
    }

    fn decode(&self, private_key: &[u8]) -> CryptoResult<KeyPair> {
        let private = Self::decode_private(private_key)?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa { private, public })
    }
}

/// RSASSA-PSS with SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaPssSigner;

impl Signer for RsaPssSigner {
    fn sign(&self, private_key: &[u8], payload: &[u8]) -> CryptoResult<Vec<u8>> {
        let private = RsaMarshaler::decode_private(private_key)?;
        let signing_key = BlindedSigningKey::<Sha256>::new(private);
        let signature = signing_key
            .try_sign_with_rng(&mut OsRng, payload)
            .map_err(CryptoError::signing)?;
        Ok(signature.to_vec())
    }
}

impl Verifier for RsaPssSigner {
    fn verify(&self, public_key: &[u8], payload: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        let public =
            RsaPublicKey::from_public_key_pem(pem_str(public_key)?).map_err(CryptoError::codec)?;
        let verifying_key = VerifyingKey::<Sha256>::new(public);
        let signature = match Signature::try_from(signature) {
            Ok(signature) => signature,
            Err(_) => return Ok(false),
        };
        Ok(verifying_key.verify(payload, &signature).is_ok())
    }
}

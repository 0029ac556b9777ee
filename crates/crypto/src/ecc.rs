//! ECC family: P-384 keys, SEC1/SPKI PEM marshaling and randomized ECDSA.
//!
//! ECDSA signs the SHA-384 digest of the payload, the curve's standard hash.

use p384::ecdsa::signature::{RandomizedSigner as _, Verifier as _};
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use p384::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use p384::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use tracing::debug;
use zeroize::Zeroizing;

use chainsign_core::SignatureAlgorithm;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{pem_str, EncodedKeyPair, KeyGenerator, KeyMarshaler, KeyPair, Signer, Verifier};

/// Generates P-384 key pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EccGenerator;

impl KeyGenerator for EccGenerator {
    fn generate(&self) -> CryptoResult<KeyPair> {
        debug!("Generating P-384 key pair");
        let private = SecretKey::random(&mut OsRng);
        let public = private.public_key();
        Ok(KeyPair::Ecc { private, public })
    }
}

/// SEC1 PEM for the private key, SPKI PEM for the public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct EccMarshaler;

impl EccMarshaler {
    pub fn new() -> Self {
        Self
    }

    fn decode_private(private_key: &[u8]) -> CryptoResult<SecretKey> {
        SecretKey::from_sec1_pem(pem_str(private_key)?).map_err(CryptoError::codec)
    }
}

impl KeyMarshaler for EccMarshaler {
    fn encode(&self, key_pair: &KeyPair) -> CryptoResult<EncodedKeyPair> {
        let (private, public) = match key_pair {
            KeyPair::Ecc { private, public } => (private, public),
            other => {
                return Err(CryptoError::KeyMismatch {
                    expected: SignatureAlgorithm::Ecc,
                    actual: other.algorithm(),
                })
            }
        };

        let private_pem = private
            .to_sec1_pem(LineEnding::LF)
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
        let public = private.public_key();
        Ok(KeyPair::Ecc { private, public })
    }
}

/// Randomized ECDSA on P-384 with DER-encoded signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaSigner;

impl Signer for EcdsaSigner {
    fn sign(&self, private_key: &[u8], payload: &[u8]) -> CryptoResult<Vec<u8>> {
        let private = EccMarshaler::decode_private(private_key)?;
        let signing_key = SigningKey::from(&private);
        let signature: Signature = signing_key
            .try_sign_with_rng(&mut OsRng, payload)
            .map_err(CryptoError::signing)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl Verifier for EcdsaSigner {
    fn verify(&self, public_key: &[u8], payload: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        let public =
            PublicKey::from_public_key_pem(pem_str(public_key)?).map_err(CryptoError::codec)?;
        let verifying_key = VerifyingKey::from(&public);
        let signature = match Signature::from_der(signature) {
            Ok(signature) => signature,
            Err(_) => return Ok(false),
        };
        Ok(verifying_key.verify(payload, &signature).is_ok())
    }
}

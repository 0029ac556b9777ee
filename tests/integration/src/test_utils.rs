//! Test utilities for signing service integration tests

use base64::Engine as _;
use chainsign_core::CryptoConfig;
use chainsign_signing::{CreateDeviceRequest, SigningService};

/// Smallest RSA size the service accepts; keeps key generation fast.
pub const TEST_RSA_KEY_BITS: usize = 1024;

/// Install a test subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Service with fast test key sizes.
pub fn test_service() -> SigningService {
    SigningService::new(&CryptoConfig {
        rsa_key_bits: TEST_RSA_KEY_BITS,
    })
}

/// Service with one registered device.
pub fn service_with_device(id: &str, algorithm: &str) -> SigningService {
    let service = test_service();
    service
        .create_device(CreateDeviceRequest::new(id, algorithm))
        .expect("device creation failed");
    service
}

pub fn decode_base64(value: &str) -> Vec<u8> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .expect("invalid base64")
}

/// Splits `"{counter}_{data}_{previous}"` into its parts.
///
/// The previous signature is base64 and never contains `_`, so the last
/// separator is unambiguous even when the data does.
pub fn split_signed_data(signed_data: &str) -> (u64, String, String) {
    let (counter, rest) = signed_data.split_once('_').expect("missing counter");
    let (data, previous) = rest.rsplit_once('_').expect("missing previous signature");
    (
        counter.parse().expect("counter is not a number"),
        data.to_string(),
        previous.to_string(),
    )
}

//! Core functionality for the Chainsign signing service.
//!
//! This crate provides the data model shared by every Chainsign component
//! together with the two concurrent stores the signing path coordinates:
//!
//! - **Device Registry**: signature devices keyed by id, owning the per-device
//!   signature counter
//! - **Transaction Ledger**: append-only store of chained transactions
//!
//! Configuration, logging setup and the error taxonomy live here as well.

pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod registry;
pub mod types;

pub use config::{Config, CryptoConfig, LoggingConfig, ServerConfig, MIN_RSA_KEY_BITS};
pub use error::{Error, ErrorKind, Result};
pub use ledger::{LedgerMetrics, TransactionLedger};
pub use registry::{CounterSlot, DeviceFilter, DeviceRegistry};
pub use types::{
    compose_signed_data, current_timestamp, encode_base64, public_key_id, Device,
    SignatureAlgorithm, Transaction,
};

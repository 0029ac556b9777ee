//! Signing orchestration for Chainsign devices.
//!
//! [`SigningService`] ties the device registry, the transaction ledger and the
//! algorithm suites together. Every transaction signed by a device links to the
//! previous one through its `previous_signature`; the first one links to the
//! device's anchor, the device id signed with the device key.

pub mod service;
pub mod validation;

pub use service::{SigningMetrics, SigningMetricsSnapshot, SigningService};
pub use validation::{
    CreateDeviceRequest, CreateDeviceResponse, GetDeviceResponse, GetTransactionResponse,
    ListDevicesRequest, ListDevicesResponse, ListTransactionsRequest, ListTransactionsResponse,
    SignTransactionRequest, SignTransactionResponse, DEVICE_CREATED_STATUS,
};

//! Signing Service - the orchestrator of device chains
//!
//! This is the only component that touches both the device registry and the
//! transaction ledger. For a signing request it:
//!
//! 1. Validates the request
//! 2. Enters the device's critical section (fails if the device is unknown)
//! 3. Picks the previous signature: the chain anchor (the device id signed by
//!    the device key) for the first transaction, otherwise the signature of
//!    the transaction with the highest counter
//! 4. Signs the raw payload
//! 5. Appends the transaction at the current counter value
//! 6. Advances the counter, only after the append succeeded
//!
//! Steps 3 to 6 run under the per-device lock, so concurrent signs on one device
//! are strictly ordered and a failed sign leaves both stores unchanged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use chainsign_core::{
    current_timestamp, encode_base64, CounterSlot, CryptoConfig, Device, DeviceRegistry, Error,
    Result, Transaction, TransactionLedger,
};
use chainsign_crypto::{verify_device_chain, SuiteParams, SuiteRegistry, VerifyResult};

use crate::validation::{
    CreateDeviceRequest, CreateDeviceResponse, GetDeviceResponse, GetTransactionResponse,
    ListDevicesRequest, ListDevicesResponse, ListTransactionsRequest, ListTransactionsResponse,
    SignTransactionRequest, SignTransactionResponse, DEVICE_CREATED_STATUS,
};

/// Metrics for observability.
#[derive(Debug, Default)]
pub struct SigningMetrics {
    devices_created_total: AtomicU64,
    transactions_signed_total: AtomicU64,
    requests_rejected_total: AtomicU64,
    signing_errors_total: AtomicU64,
}

/// Point-in-time copy of [`SigningMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SigningMetricsSnapshot {
    pub devices_created_total: u64,
    pub transactions_signed_total: u64,
    pub requests_rejected_total: u64,
    pub signing_errors_total: u64,
}

impl SigningMetrics {
    pub fn snapshot(&self) -> SigningMetricsSnapshot {
        SigningMetricsSnapshot {
            devices_created_total: self.devices_created_total.load(Ordering::Relaxed),
            transactions_signed_total: self.transactions_signed_total.load(Ordering::Relaxed),
            requests_rejected_total: self.requests_rejected_total.load(Ordering::Relaxed),
            signing_errors_total: self.signing_errors_total.load(Ordering::Relaxed),
        }
    }

    fn record_failure(&self, err: &Error) {
        let counter = match err.kind() {
            chainsign_core::ErrorKind::Validation
            | chainsign_core::ErrorKind::NotFound
            | chainsign_core::ErrorKind::Conflict => &self.requests_rejected_total,
            _ => &self.signing_errors_total,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Coordinates devices, key suites and the ledger.
///
/// Cloning is cheap; clones share the same stores.
#[derive(Clone)]
pub struct SigningService {
    registry: Arc<DeviceRegistry>,
    ledger: Arc<TransactionLedger>,
    suites: Arc<SuiteRegistry>,
    metrics: Arc<SigningMetrics>,
    next_transaction_id: fn() -> String,
}

fn random_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

impl SigningService {
    /// Creates a service with empty stores.
    pub fn new(config: &CryptoConfig) -> Self {
        Self::with_stores(
            Arc::new(DeviceRegistry::new()),
            Arc::new(TransactionLedger::new()),
            SuiteParams::from(config),
        )
    }

    /// Creates a service over existing stores.
    pub fn with_stores(
        registry: Arc<DeviceRegistry>,
        ledger: Arc<TransactionLedger>,
        params: SuiteParams,
    ) -> Self {
        Self {
            registry,
            ledger,
            suites: Arc::new(SuiteRegistry::new(params)),
            metrics: Arc::new(SigningMetrics::default()),
            next_transaction_id: random_transaction_id,
        }
    }

    #[cfg(test)]
    fn with_transaction_ids(mut self, next: fn() -> String) -> Self {
        self.next_transaction_id = next;
        self
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> SigningMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Issues a new signature device with a freshly generated key pair.
    pub fn create_device(&self, request: CreateDeviceRequest) -> Result<CreateDeviceResponse> {
        self.observe(self.create_device_inner(request))
    }

    fn create_device_inner(&self, request: CreateDeviceRequest) -> Result<CreateDeviceResponse> {
        let algorithm = request.validate()?;

        // Key generation is expensive; skip it for ids that are already taken.
        // `create` below still decides races between concurrent creators.
        if self.registry.contains(&request.id) {
            return Err(Error::DeviceAlreadyExists {
                device_id: request.id,
            });
        }

        let keys = self.suites.get(algorithm).generate_encoded()?;
        let label = request.normalized_label();
        let device = Device::new(request.id, label, algorithm, keys.public, keys.private);
        let device = self.registry.create(device)?;

        self.metrics
            .devices_created_total
            .fetch_add(1, Ordering::Relaxed);
        info!(
            device_id = %device.id,
            algorithm = %device.algorithm,
            public_key_id = %device.public_key_id,
            "Signature device created"
        );

        Ok(CreateDeviceResponse {
            status: DEVICE_CREATED_STATUS.to_string(),
        })
    }

    pub fn list_devices(&self, request: ListDevicesRequest) -> Result<ListDevicesResponse> {
        let filter = self.observe(request.to_filter())?;
        let devices = self.observe(self.registry.list(&filter))?;
        Ok(ListDevicesResponse { devices })
    }

    pub fn get_device(&self, id: &str) -> Result<GetDeviceResponse> {
        let device = self.observe(self.registry.get(id))?;
        Ok(GetDeviceResponse { device })
    }

    /// Signs a payload with a device and appends the chained transaction.
    pub fn sign_transaction(
        &self,
        request: SignTransactionRequest,
    ) -> Result<SignTransactionResponse> {
        let data = self.observe(request.validate())?;

        let transaction = self.observe(self.registry.with_counter(
            &request.device_id,
            |device, slot| self.append_next(device, slot, data),
        ))?;

        self.metrics
            .transactions_signed_total
            .fetch_add(1, Ordering::Relaxed);
        info!(
            device_id = %transaction.device_id,
            transaction_id = %transaction.id,
            counter_value = transaction.counter_value,
            "Transaction signed"
        );

        Ok(SignTransactionResponse {
            signature: encode_base64(&transaction.signature),
            signed_data: transaction.signed_data(),
        })
    }

    /// Runs inside the device critical section.
    fn append_next(
        &self,
        device: &Device,
        slot: &mut CounterSlot<'_>,
        data: &str,
    ) -> Result<Transaction> {
        let suite = self.suites.get(device.algorithm);
        let counter_value = slot.peek();

        let previous_signature = match self.ledger.latest_for_device(&device.id)? {
            None if counter_value == 0 => {
                debug!(device_id = %device.id, "Signing chain anchor");
                suite.sign(&device.key_material, device.id.as_bytes())?
            }
            Some(latest) if latest.counter_value + 1 == counter_value => latest.signature,
            latest => {
                let reason = format!(
                    "device counter is {} but ledger head is {:?}",
                    counter_value,
                    latest.map(|tx| tx.counter_value)
                );
                warn!(device_id = %device.id, %reason, "Chain inconsistency detected");
                return Err(Error::ChainInconsistency {
                    device_id: device.id.clone(),
                    reason,
                });
            }
        };

        let signature = suite.sign(&device.key_material, data.as_bytes())?;

        let transaction = Transaction {
            id: (self.next_transaction_id)(),
            device_id: device.id.clone(),
            counter_value,
            data: data.to_string(),
            previous_signature,
            signature,
            created_at: current_timestamp(),
        };
        let stored = self.ledger.append(transaction)?;
        slot.advance();

        Ok(stored)
    }

    pub fn list_transactions(
        &self,
        request: ListTransactionsRequest,
    ) -> Result<ListTransactionsResponse> {
        let transactions = self.observe(self.ledger.list_for_device(request.device_id.as_deref()))?;
        Ok(ListTransactionsResponse { transactions })
    }

    pub fn get_transaction(&self, id: &str) -> Result<GetTransactionResponse> {
        let transaction = self.observe(self.ledger.get(id))?;
        Ok(GetTransactionResponse { transaction })
    }

    /// Verifies the full chain of a device against its public key.
    pub fn verify_chain(&self, device_id: &str) -> Result<VerifyResult> {
        let device = self.observe(self.registry.get(device_id))?;
        let transactions = self.observe(self.ledger.list_for_device(Some(device_id)))?;

        let result = verify_device_chain(self.suites.get(device.algorithm), &device, &transactions);
        if !result.is_ok() {
            warn!(device_id = %device_id, %result, "Device chain verification failed");
        }
        Ok(result)
    }

    fn observe<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.metrics.record_failure(err);
            debug!(error = %err, kind = %err.kind(), "Request failed");
        }
        result
    }
}

//! Transaction Ledger - Append-Only Store of Signed Transactions
//!
//! This module provides the in-memory, append-only ledger for chained
//! transactions with:
//! - Strict append-only semantics (no updates or deletes)
//! - Unique transaction ids
//! - Per-device lookup of the chain head
//! - Observability metrics
//!
//! # Guarantees
//!
//! - A transaction is visible to readers only once `append` has returned
//! - `latest_for_device` returns the highest `counter_value` appended so far
//! - Listing order is append order, stable for a fixed ledger state

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::Transaction;

/// Observability metrics for the ledger
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerMetrics {
    /// Total transactions appended to the ledger
    pub ledger_transactions_appended_total: u64,
    /// Total appends rejected as duplicates
    pub ledger_duplicates_rejected_total: u64,
}

#[derive(Default)]
struct DeviceChain {
    /// Transaction ids in append order
    ids: Vec<String>,
    /// Id and counter of the transaction with the highest counter
    head: Option<(String, u64)>,
}

impl DeviceChain {
    fn push(&mut self, transaction: &Transaction) {
        self.ids.push(transaction.id.clone());
        let is_new_head = self
            .head
            .as_ref()
            .map_or(true, |(_, counter)| transaction.counter_value > *counter);
        if is_new_head {
            self.head = Some((transaction.id.clone(), transaction.counter_value));
        }
    }
}

#[derive(Default)]
struct LedgerState {
    /// Transaction ids in append order
    order: Vec<String>,
    by_id: HashMap<String, Transaction>,
    by_device: HashMap<String, DeviceChain>,
}

/// Append-only transaction store keyed by transaction id.
#[derive(Default)]
pub struct TransactionLedger {
    state: RwLock<LedgerState>,
    appended_total: AtomicU64,
    duplicates_total: AtomicU64,
}

impl TransactionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction.
    ///
    /// Fails with [`Error::TransactionAlreadyExists`] if the id is taken.
    pub fn append(&self, transaction: Transaction) -> Result<Transaction> {
        let mut state = self
            .state
            .write()
            .map_err(|_| Error::LockPoisoned("transaction ledger"))?;

        if state.by_id.contains_key(&transaction.id) {
            self.duplicates_total.fetch_add(1, Ordering::Relaxed);
            warn!(
                transaction_id = %transaction.id,
                device_id = %transaction.device_id,
                "Rejected duplicate transaction id"
            );
            return Err(Error::TransactionAlreadyExists {
                transaction_id: transaction.id,
            });
        }

        debug!(
            transaction_id = %transaction.id,
            device_id = %transaction.device_id,
            counter_value = transaction.counter_value,
            "Appending transaction"
        );

        state.order.push(transaction.id.clone());
        state
            .by_device
            .entry(transaction.device_id.clone())
            .or_default()
            .push(&transaction);
        state
            .by_id
            .insert(transaction.id.clone(), transaction.clone());

        self.appended_total.fetch_add(1, Ordering::Relaxed);
        Ok(transaction)
    }

    /// Look up a transaction by id.
    pub fn get(&self, id: &str) -> Result<Transaction> {
        let state = self.read_state()?;
        state
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| Error::TransactionNotFound {
                transaction_id: id.to_string(),
            })
    }

    /// Transactions of one device, or of all devices when `device_id` is
    /// `None` or empty, in append order.
    pub fn list_for_device(&self, device_id: Option<&str>) -> Result<Vec<Transaction>> {
        let state = self.read_state()?;

        let ids: &[String] = match device_id {
            None | Some("") => &state.order,
            Some(device_id) => match state.by_device.get(device_id) {
                Some(chain) => &chain.ids,
                None => return Ok(Vec::new()),
            },
        };

        Ok(ids
            .iter()
            .filter_map(|id| state.by_id.get(id).cloned())
            .collect())
    }

    /// The transaction with the highest counter value for a device, if any.
    pub fn latest_for_device(&self, device_id: &str) -> Result<Option<Transaction>> {
        let state = self.read_state()?;
        let latest = state
            .by_device
            .get(device_id)
            .and_then(|chain| chain.head.as_ref())
            .and_then(|(id, _)| state.by_id.get(id))
            .cloned();
        Ok(latest)
    }

    /// Total number of stored transactions.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.order.len()).unwrap_or(0)
    }

    /// Whether the ledger holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the ledger metrics.
    pub fn metrics(&self) -> LedgerMetrics {
        LedgerMetrics {
            ledger_transactions_appended_total: self.appended_total.load(Ordering::Relaxed),
            ledger_duplicates_rejected_total: self.duplicates_total.load(Ordering::Relaxed),
        }
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.state
            .read()
            .map_err(|_| Error::LockPoisoned("transaction ledger"))
    }
}

//! Device Registry - concurrent store of signature devices
//!
//! Devices are kept in an insertion-ordered index guarded by a reader/writer
//! lock. Each entry splits into an immutable record, an atomic signature
//! counter and a sign lock, which is the per-device critical section for
//! counter assignment:
//!
//! - `create` holds the index write lock, so exactly one creator of an id wins
//! - `get` and `list` copy the record and load the counter without touching
//!   the sign lock, so reads never wait behind signing
//! - `with_counter` holds the sign lock for the whole closure; the signing
//!   path runs "read latest → sign → append → advance" inside it

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Device, SignatureAlgorithm};

/// Filter for [`DeviceRegistry::list`]. Unset or empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub id: Option<String>,
    pub label: Option<String>,
    pub algorithm: Option<SignatureAlgorithm>,
}

impl DeviceFilter {
    fn matches(&self, device: &Device) -> bool {
        let id_ok = match self.id.as_deref() {
            None | Some("") => true,
            Some(id) => device.id == id,
        };
        let label_ok = match self.label.as_deref() {
            None | Some("") => true,
            Some(label) => device.label.as_deref() == Some(label),
        };
        let algorithm_ok = self
            .algorithm
            .map_or(true, |algorithm| device.algorithm == algorithm);

        id_ok && label_ok && algorithm_ok
    }
}

/// Handle on a device's signature counter, valid while the sign lock is held.
pub struct CounterSlot<'a> {
    counter: &'a AtomicU64,
}

impl CounterSlot<'_> {
    /// Counter value the next transaction will be assigned.
    pub fn peek(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    /// Advance the counter by one and return the pre-increment value.
    pub fn advance(&mut self) -> u64 {
        self.counter.fetch_add(1, Ordering::AcqRel)
    }
}

/// One registered device.
///
/// The record never changes after creation; the counter is the only mutable
/// part and is written only while `sign_lock` is held.
struct DeviceEntry {
    record: Device,
    counter: AtomicU64,
    sign_lock: Mutex<()>,
}

impl DeviceEntry {
    fn new(device: Device) -> Self {
        let counter = AtomicU64::new(device.signature_counter);
        Self {
            record: device,
            counter,
            sign_lock: Mutex::new(()),
        }
    }

    fn snapshot(&self) -> Device {
        let mut device = self.record.clone();
        device.signature_counter = self.counter.load(Ordering::Acquire);
        device
    }
}

#[derive(Default)]
struct RegistryIndex {
    /// Device ids in creation order
    order: Vec<String>,
    entries: HashMap<String, Arc<DeviceEntry>>,
}

/// Concurrent device store keyed by device id.
#[derive(Default)]
pub struct DeviceRegistry {
    index: RwLock<RegistryIndex>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new device.
    ///
    /// Fails with [`Error::DeviceAlreadyExists`] if the id is taken.
    pub fn create(&self, device: Device) -> Result<Device> {
        let mut index = self
            .index
            .write()
            .map_err(|_| Error::LockPoisoned("device registry"))?;

        if index.entries.contains_key(&device.id) {
            return Err(Error::DeviceAlreadyExists {
                device_id: device.id,
            });
        }

        debug!(device_id = %device.id, algorithm = %device.algorithm, "Registering device");

        let stored = device.clone();
        index.order.push(device.id.clone());
        index
            .entries
            .insert(device.id.clone(), Arc::new(DeviceEntry::new(device)));

        Ok(stored)
    }

    /// Snapshot of a device, including its current counter.
    ///
    /// Never waits on a signing operation in progress.
    pub fn get(&self, id: &str) -> Result<Device> {
        Ok(self.entry(id)?.snapshot())
    }

    /// Devices matching every supplied filter field, in creation order.
    pub fn list(&self, filter: &DeviceFilter) -> Result<Vec<Device>> {
        let index = self
            .index
            .read()
            .map_err(|_| Error::LockPoisoned("device registry"))?;

        Ok(index
            .order
            .iter()
            .filter_map(|id| index.entries.get(id))
            .filter(|entry| filter.matches(&entry.record))
            .map(|entry| entry.snapshot())
            .collect())
    }

    /// Atomically advance a device counter, returning the pre-increment value.
    pub fn increment_counter(&self, id: &str) -> Result<u64> {
        self.with_counter(id, |_, slot| Ok(slot.advance()))
    }

    /// Run `f` inside the device's critical section.
    ///
    /// `f` receives a snapshot of the device and the counter slot. Concurrent
    /// calls for the same device are serialized; other devices proceed in
    /// parallel. Readers are not blocked and see the counter move only when
    /// `f` advances it.
    pub fn with_counter<T, E, F>(&self, id: &str, f: F) -> std::result::Result<T, E>
    where
        E: From<Error>,
        F: FnOnce(&Device, &mut CounterSlot<'_>) -> std::result::Result<T, E>,
    {
        let entry = self.entry(id)?;
        let _guard = entry
            .sign_lock
            .lock()
            .map_err(|_| Error::LockPoisoned("device entry"))?;
        let snapshot = entry.snapshot();
        let mut slot = CounterSlot {
            counter: &entry.counter,
        };
        f(&snapshot, &mut slot)
    }

    /// Whether a device id is taken.
    pub fn contains(&self, id: &str) -> bool {
        self.entry(id).is_ok()
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.index.read().map(|i| i.order.len()).unwrap_or(0)
    }

    /// Whether no device has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, id: &str) -> Result<Arc<DeviceEntry>> {
        let index = self
            .index
            .read()
            .map_err(|_| Error::LockPoisoned("device registry"))?;
        index
            .entries
            .get(id)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound {
                device_id: id.to_string(),
            })
    }
}

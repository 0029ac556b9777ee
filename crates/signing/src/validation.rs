//! Request and response shapes of the signing operations.
//!
//! Requests are validated before any registry or ledger access. Responses
//! never carry private key material: [`Device`] skips it on serialization.

use serde::{Deserialize, Serialize};

use chainsign_core::{Device, DeviceFilter, Error, Result, SignatureAlgorithm, Transaction};

/// Status reported by a successful device creation.
pub const DEVICE_CREATED_STATUS: &str = "Device Created";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CreateDeviceRequest {
    pub fn new(id: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            algorithm: algorithm.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Checks required fields and resolves the algorithm family.
    pub fn validate(&self) -> Result<SignatureAlgorithm> {
        if self.id.is_empty() {
            return Err(Error::validation("id", "is a required field"));
        }
        if self.algorithm.is_empty() {
            return Err(Error::validation("algorithm", "is a required field"));
        }
        self.algorithm.parse()
    }

    /// Label with empty strings treated as absent.
    pub(crate) fn normalized_label(&self) -> Option<String> {
        self.label.clone().filter(|label| !label.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDevicesRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub algorithm: Option<String>,
}

impl ListDevicesRequest {
    /// Converts the query into a registry filter.
    ///
    /// An empty algorithm matches all devices; an unknown one is rejected.
    pub fn to_filter(&self) -> Result<DeviceFilter> {
        let algorithm = match self.algorithm.as_deref() {
            None | Some("") => None,
            Some(name) => Some(name.parse::<SignatureAlgorithm>()?),
        };
        Ok(DeviceFilter {
            id: self.id.clone(),
            label: self.label.clone(),
            algorithm,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignTransactionRequest {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub data: Option<String>,
}

impl SignTransactionRequest {
    pub fn new(device_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            data: Some(data.into()),
        }
    }

    /// Checks required fields and returns the payload.
    ///
    /// An empty payload is accepted; a missing one is not.
    pub fn validate(&self) -> Result<&str> {
        if self.device_id.is_empty() {
            return Err(Error::validation("device_id", "is a required field"));
        }
        self.data
            .as_deref()
            .ok_or_else(|| Error::validation("data", "is a required field"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTransactionsRequest {
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDeviceResponse {
    pub device: Device,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionResponse {
    /// Base64 signature over the raw payload
    pub signature: String,
    /// `"{counter}_{data}_{previous_signature}"`
    pub signed_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTransactionResponse {
    pub transaction: Transaction,
}

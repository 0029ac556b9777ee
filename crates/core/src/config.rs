//! Configuration management for Chainsign.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Smallest RSA modulus that leaves room for a PSS salt with SHA-256.
pub const MIN_RSA_KEY_BITS: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crypto: CryptoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// RSA modulus size for newly generated device keys
    pub rsa_key_bits: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self { rsa_key_bits: 2048 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration: file named by `CHAINSIGN_CONFIG` (if set), then
    /// environment overrides.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var("CHAINSIGN_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default_config(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `CHAINSIGN_*` overrides from a variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("CHAINSIGN_LISTEN_ADDRESS") {
            self.server.listen_address = address;
        }
        if let Some(bits) = lookup("CHAINSIGN_RSA_KEY_BITS") {
            self.crypto.rsa_key_bits = bits
                .parse()
                .map_err(|_| Error::Config(format!("invalid CHAINSIGN_RSA_KEY_BITS: {}", bits)))?;
        }
        if let Some(json) = lookup("CHAINSIGN_LOG_JSON") {
            self.logging.json = matches!(json.as_str(), "1" | "true" | "yes");
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.listen_address.is_empty() {
            return Err(Error::Config("listen_address must not be empty".to_string()));
        }
        if self.crypto.rsa_key_bits < MIN_RSA_KEY_BITS {
            return Err(Error::Config(format!(
                "rsa_key_bits must be at least {} (got {})",
                MIN_RSA_KEY_BITS, self.crypto.rsa_key_bits
            )));
        }
        Ok(())
    }

    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            crypto: CryptoConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.listen_address, "0.0.0.0:8080");
        assert_eq!(config.crypto.rsa_key_bits, 2048);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [crypto]
            rsa_key_bits = 1024
            "#,
        )
        .unwrap();

        assert_eq!(config.crypto.rsa_key_bits, 1024);
        assert_eq!(config.server.listen_address, "0.0.0.0:8080");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_reject_small_rsa_keys() {
        let result = Config::from_toml_str("[crypto]\nrsa_key_bits = 512\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CHAINSIGN_LISTEN_ADDRESS", "127.0.0.1:9000"),
            ("CHAINSIGN_RSA_KEY_BITS", "3072"),
            ("CHAINSIGN_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let config = Config::default_config()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.listen_address, "127.0.0.1:9000");
        assert_eq!(config.crypto.rsa_key_bits, 3072);
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_override() {
        let result = Config::default_config().with_overrides(|key| {
            (key == "CHAINSIGN_RSA_KEY_BITS").then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }
}

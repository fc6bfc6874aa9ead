//! Store configuration via `walletdb.toml`
//!
//! On first open, a default `walletdb.toml` is created in the data directory.
//! To change settings, edit the file and reopen the store.

use serde::{Deserialize, Serialize};
use std::path::Path;
use walletdb_core::{Error, Result};
use walletdb_storage::StoreOptions;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "walletdb.toml";

/// Store configuration loaded from `walletdb.toml`.
///
/// # Example
///
/// ```toml
/// # Run pending namespace migrations when the store is opened
/// auto_upgrade = true
///
/// # Store file inside the data directory
/// file_name = "wallet.db"
///
/// # cache_size_mb = 64
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletDbConfig {
    /// Run pending migrations at open. When false, a namespace that is
    /// behind makes the open fail instead.
    #[serde(default = "default_auto_upgrade")]
    pub auto_upgrade: bool,
    /// Name of the store file inside the data directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Page cache size in megabytes; unset keeps the store default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_size_mb: Option<usize>,
}

fn default_auto_upgrade() -> bool {
    true
}

fn default_file_name() -> String {
    "wallet.db".to_string()
}

impl Default for WalletDbConfig {
    fn default() -> Self {
        Self {
            auto_upgrade: default_auto_upgrade(),
            file_name: default_file_name(),
            cache_size_mb: None,
        }
    }
}

impl WalletDbConfig {
    /// Check field values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `file_name` is empty or contains a
    /// path separator, or if `cache_size_mb` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(Error::configuration(format!(
                "Invalid file_name '{}' in {}. Expected a bare file name.",
                self.file_name, CONFIG_FILE_NAME
            )));
        }
        if self.cache_size_mb == Some(0) {
            return Err(Error::configuration(format!(
                "cache_size_mb in {} must be greater than zero",
                CONFIG_FILE_NAME
            )));
        }
        Ok(())
    }

    /// Options handed to the store when opening it.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            cache_size_bytes: self.cache_size_mb.map(|mb| mb.saturating_mul(1024 * 1024)),
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# walletdb configuration
#
# Run pending namespace migrations when the store is opened (default: true).
# When false, opening a store whose namespaces are behind fails instead.
auto_upgrade = true

# Store file inside the data directory.
file_name = "wallet.db"

# Page cache size in megabytes (default: store default).
# cache_size_mb = 64
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WalletDbConfig = toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

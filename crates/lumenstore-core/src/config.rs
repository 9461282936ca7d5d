//! Configuration management for LumenStore
//!
//! Provides write-policy presets and a validator for custom configurations.

use crate::error::{StoreError, StoreResult};

/// How a sync replaces the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate the backing file and write in place.
    ///
    /// A crash mid-write leaves a truncated file behind.
    Overwrite,
    /// Write `<path>.tmp`, sync it, rename it over the backing file,
    /// then sync the parent directory.
    AtomicReplace,
}

/// LumenStore configuration with durability presets
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How the backing file is replaced on every sync
    pub write_mode: WriteMode,
    /// Force written bytes to stable storage before a sync returns
    pub durable_writes: bool,
    /// Unix permission bits for newly created files
    pub file_mode: u32,
    /// Maximum key size in bytes; `None` means unlimited
    pub max_key_size: Option<usize>,
    /// Maximum value size in bytes; `None` means unlimited
    pub max_value_size: Option<usize>,
}

impl StoreConfig {
    /// Atomic replace with a durable sync on every write.
    pub fn durable() -> Self {
        Self {
            write_mode: WriteMode::AtomicReplace,
            durable_writes: true,
            file_mode: 0o600,
            max_key_size: None,
            max_value_size: None,
        }
    }

    /// In-place overwrite without a sync to stable storage.
    ///
    /// Matches how stores written by older tooling were maintained.
    pub fn legacy() -> Self {
        Self {
            write_mode: WriteMode::Overwrite,
            durable_writes: false,
            ..Self::durable()
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> StoreResult<()> {
        if self.max_key_size == Some(0) {
            return Err(StoreError::InvalidConfig("max_key_size must be > 0".into()));
        }
        if self.max_value_size == Some(0) {
            return Err(StoreError::InvalidConfig("max_value_size must be > 0".into()));
        }
        if self.file_mode & !0o600 != 0 {
            return Err(StoreError::InvalidConfig(format!(
                "file_mode {:o} grants access beyond owner read/write",
                self.file_mode
            )));
        }
        if self.file_mode & 0o600 != 0o600 {
            return Err(StoreError::InvalidConfig(format!(
                "file_mode {:o} must allow owner read/write",
                self.file_mode
            )));
        }
        Ok(())
    }

    /// Reject a key/value pair that exceeds a configured limit.
    ///
    /// With no limits set (the default) every pair is accepted.
    pub fn check_entry(&self, key: &str, value: &str) -> StoreResult<()> {
        check_size("key", key.len(), self.max_key_size)?;
        check_size("value", value.len(), self.max_value_size)
    }
}

fn check_size(component: &'static str, size: usize, limit: Option<usize>) -> StoreResult<()> {
    match limit {
        Some(max) if size > max => Err(StoreError::OversizedEntry { component, size, max }),
        _ => Ok(()),
    }
}

impl Default for StoreConfig {
    fn default() -> Self { Self::durable() }
}

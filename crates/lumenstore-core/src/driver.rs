//! Store drivers selected by name.
//!
//! Callers depend only on [`KvStore`] and pick a backend with a
//! `driver:params` string such as `file:/home/me/.lumen-data.yml`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::FileStore;

/// Name of the file-backed driver
pub const FILE_DRIVER: &str = "file";

/// The capability set every driver provides.
pub trait KvStore: Send + Sync {
    /// Insert or replace `key`; a zero `ttl` never expires.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Value for `key`, or `NotFound` if absent or expired.
    fn get(&self, key: &str) -> StoreResult<String>;

    /// Remove `key`; absent keys are not an error.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Driver name this store was opened with.
    fn driver(&self) -> &str;

    /// Driver-specific parameters this store was opened with.
    fn parameters(&self) -> String;
}

impl KvStore for FileStore {
    fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        FileStore::set(self, key, value, ttl)
    }

    fn get(&self, key: &str) -> StoreResult<String> {
        FileStore::get(self, key)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        FileStore::delete(self, key)
    }

    fn driver(&self) -> &str {
        FILE_DRIVER
    }

    fn parameters(&self) -> String {
        self.path().display().to_string()
    }
}

/// A parsed `driver:params` store selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSpec {
    pub driver: String,
    pub params: String,
}

impl StoreSpec {
    pub fn new(driver: impl Into<String>, params: impl Into<String>) -> Self {
        Self { driver: driver.into(), params: params.into() }
    }

    /// Split on the first `:` only, so Windows paths like `file:C:\x` survive.
    pub fn parse(spec: &str) -> StoreResult<Self> {
        match spec.split_once(':') {
            Some((driver, params)) if !driver.is_empty() => Ok(Self::new(driver, params)),
            _ => Err(StoreError::InvalidStoreSpec { spec: spec.to_string() }),
        }
    }

    /// `file:<home>/.lumen-data.yml`
    pub fn default_for_home(home: &Path) -> Self {
        Self::new(FILE_DRIVER, home.join(".lumen-data.yml").display().to_string())
    }

    pub fn open(&self) -> StoreResult<Box<dyn KvStore>> {
        open_store(&self.driver, &self.params)
    }
}

impl FromStr for StoreSpec {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StoreSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.driver, self.params)
    }
}

/// Open a store by driver name and driver-specific parameters.
pub fn open_store(driver: &str, params: &str) -> StoreResult<Box<dyn KvStore>> {
    debug!("selecting store driver: {} params: {}", driver, params);
    match driver {
        FILE_DRIVER => {
            if params.is_empty() {
                return Err(StoreError::InvalidStoreSpec { spec: format!("{}:", driver) });
            }
            Ok(Box::new(FileStore::open(params)?))
        }
        other => Err(StoreError::UnknownDriver { driver: other.to_string() }),
    }
}

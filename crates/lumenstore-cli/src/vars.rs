//! Namespace-scoped variables.
//!
//! One flat key space is shared by every namespace; each key is stored as
//! `<namespace>:<key>`. Two namespaces never see each other's variables
//! as long as neither name contains `:`.

use std::time::Duration;

use log::debug;

use lumenstore_core::{KvStore, StoreResult, StoreSpec};

/// Variables in one namespace of a store.
pub struct Vars {
    store: Box<dyn KvStore>,
    namespace: String,
}

impl Vars {
    /// Scope an already open store to `namespace`.
    pub fn new(store: Box<dyn KvStore>, namespace: impl Into<String>) -> Self {
        Self { store, namespace: namespace.into() }
    }

    /// Open the store named by `spec` and scope it to `namespace`.
    pub fn open(spec: &StoreSpec, namespace: impl Into<String>) -> StoreResult<Self> {
        Ok(Self::new(spec.open()?, namespace))
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Set a variable that never expires.
    pub fn set_var(&self, key: &str, value: &str) -> StoreResult<()> {
        self.set_var_with_ttl(key, value, Duration::ZERO)
    }

    /// Set a variable that expires `ttl` from now (zero means never).
    pub fn set_var_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let key = self.scoped(key);
        debug!("set_var: {} (ttl {:?})", key, ttl);
        self.store.set(&key, value, ttl)
    }

    /// Read a live variable; `NotFound` when absent or expired.
    pub fn get_var(&self, key: &str) -> StoreResult<String> {
        let key = self.scoped(key);
        debug!("get_var: {}", key);
        self.store.get(&key)
    }

    /// Delete a variable; absent variables are not an error.
    pub fn del_var(&self, key: &str) -> StoreResult<()> {
        let key = self.scoped(key);
        debug!("del_var: {}", key);
        self.store.delete(&key)
    }

    /// Namespace every key is prefixed with.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Underlying store, unscoped.
    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for Vars {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vars")
            .field("driver", &self.store.driver())
            .field("parameters", &self.store.parameters())
            .field("namespace", &self.namespace)
            .finish()
    }
}

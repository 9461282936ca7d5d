//! Namespaced variables over LumenStore
//!
//! The glue between a command line and a [`KvStore`] driver:
//!
//! - Pick a backend from a `driver:params` string (flag, env, or home default)
//! - Scope every key to a namespace, stored as `<ns>:<key>`
//!
//! All storage semantics (TTL, durability, locking) live in `lumenstore-core`.

pub mod settings;
pub mod vars;

pub use settings::Settings;
pub use vars::Vars;

pub use lumenstore_core::{KvStore, StoreError, StoreSpec};

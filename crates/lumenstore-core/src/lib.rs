//! LumenStore Core — Embedded File-Backed Key-Value Store
//!
//! A small persistent key-value store with per-key time-to-live, kept
//! entirely in RAM and rewritten to a single file on every mutation.
//!
//! # Architecture
//!
//! - **Read path**: shared lock over the in-memory dataset, lazy expiry check
//! - **Write path**: exclusive lock, mutate, bump `seq`, rewrite the whole file
//! - **Expiry**: lazy only; expired entries read as absent until overwritten,
//!   deleted, or removed by an explicit [`FileStore::purge_expired`]
//!
//! # Drivers
//!
//! Callers that should not care about the backend use [`KvStore`] and
//! [`open_store`]. The file driver is the only one built in.

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod persist;
pub mod platform_durability;
pub mod store;

// Re-export key types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{StoreConfig, WriteMode};
pub use driver::{open_store, KvStore, StoreSpec, FILE_DRIVER};
pub use error::{StoreError, StoreResult};
pub use format::{Dataset, Entry, FORMAT_VERSION};
pub use store::FileStore;

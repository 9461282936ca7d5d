//! Resolved command-line settings.
//!
//! Store precedence: explicit `--store` (or `LUMEN_STORE`, which clap folds
//! into the same flag), then `file:$HOME/.lumen-data.yml`.

use std::path::{Path, PathBuf};

use log::debug;

use lumenstore_core::{StoreResult, StoreSpec};

/// Environment variable naming the store (`driver:params`)
pub const STORE_ENV: &str = "LUMEN_STORE";

/// Environment variable naming the namespace
pub const NAMESPACE_ENV: &str = "LUMEN_NS";

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreSpec,
    pub namespace: String,
}

impl Settings {
    /// Resolve settings from optional overrides, falling back to `home`.
    ///
    /// Without a home directory the default store lands in the working
    /// directory.
    pub fn resolve(store: Option<&str>, namespace: Option<&str>, home: Option<&Path>) -> StoreResult<Self> {
        let store = match store {
            Some(spec) => {
                debug!("using store {}", spec);
                StoreSpec::parse(spec)?
            }
            None => {
                debug!("using default store");
                StoreSpec::default_for_home(home.unwrap_or_else(|| Path::new(".")))
            }
        };

        let namespace = match namespace {
            Some(ns) if !ns.is_empty() => ns.to_string(),
            _ => DEFAULT_NAMESPACE.to_string(),
        };
        debug!("using namespace {}", namespace);

        Ok(Self { store, namespace })
    }
}

/// The user's home directory from the environment.
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

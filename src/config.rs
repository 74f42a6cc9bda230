//! Server configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::migrate::MigrationPolicy;
use crate::port::DEFAULT_KEY;

/// Where the player collection is persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageKind {
    /// `<data_dir>/<key>.json`.
    #[default]
    File,
    /// Process memory only; lost on restart.
    Memory,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(StorageKind::File),
            "memory" => Ok(StorageKind::Memory),
            other => Err(format!("unknown storage kind: {}", other)),
        }
    }
}

/// Configuration for the tier list server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub storage: StorageKind,
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub migration: MigrationPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            storage: StorageKind::default(),
            data_dir: PathBuf::from("data"),
            storage_key: DEFAULT_KEY.to_string(),
            migration: MigrationPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TIER_LIST_BIND` - Listen address (default: 0.0.0.0:3000)
    /// - `TIER_LIST_STORAGE` - `file` or `memory` (default: file)
    /// - `TIER_LIST_DATA_DIR` - Directory for the collection file (default: data)
    /// - `TIER_LIST_STORAGE_KEY` - Key the collection is stored under (default: players)
    /// - `TIER_LIST_MIGRATION` - `normalize` or `discard` (default: normalize)
    ///
    /// Unparseable values keep their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(bind) = lookup("TIER_LIST_BIND").filter(|v| !v.is_empty()) {
            config.bind = bind;
        }

        if let Some(storage) = parse(&lookup, "TIER_LIST_STORAGE") {
            config.storage = storage;
        }

        if let Some(dir) = lookup("TIER_LIST_DATA_DIR").filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(key) = lookup("TIER_LIST_STORAGE_KEY").filter(|v| !v.is_empty()) {
            config.storage_key = key;
        }

        if let Some(policy) = parse(&lookup, "TIER_LIST_MIGRATION") {
            config.migration = policy;
        }

        config
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

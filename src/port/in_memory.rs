//! InMemoryCollection - HashMap-backed key-value port for tests and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{CollectionPort, DEFAULT_KEY};
use crate::error::PortError;

/// In-memory key-value service holding the player blob.
///
/// Clone-friendly via Arc: clones share storage, the way several request
/// handlers share one remote key-value service.
#[derive(Clone)]
pub struct InMemoryCollection {
    key: String,
    storage: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl Default for InMemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCollection {
    /// Create an empty collection under the default key.
    pub fn new() -> Self {
        Self::with_key(DEFAULT_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed raw bytes under the collection key, bypassing any encoding.
    /// Used to simulate blobs written by older versions.
    pub fn put_raw(&self, bytes: impl Into<Vec<u8>>) -> Result<(), PortError> {
        let mut storage = self.storage.write().map_err(|_| PortError::LockPoisoned)?;
        storage.insert(self.key.clone(), bytes.into());
        Ok(())
    }

    /// Number of keys held, across all collections sharing this storage.
    pub fn len(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CollectionPort for InMemoryCollection {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PortError> {
        let storage = self.storage.read().map_err(|_| PortError::LockPoisoned)?;
        Ok(storage.get(&self.key).cloned())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PortError> {
        self.put_raw(bytes)
    }
}

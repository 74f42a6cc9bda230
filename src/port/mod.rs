//! Collection ports - where the player collection is persisted.
//!
//! A port stores exactly one thing: the serialized JSON array of player
//! records under a single key. Every write replaces the whole blob; there
//! is no incremental persistence.
//!
//! ## Example
//!
//! ```
//! use tier_list::{CollectionPort, InMemoryCollection};
//!
//! let port = InMemoryCollection::new();
//! assert!(port.load().unwrap().is_none());
//!
//! port.save(b"[]").unwrap();
//! assert_eq!(port.load().unwrap().as_deref(), Some(&b"[]"[..]));
//! ```

mod file;
mod in_memory;

pub use file::FileCollection;
pub use in_memory::InMemoryCollection;

use crate::error::PortError;

/// Storage key used when none is configured.
pub const DEFAULT_KEY: &str = "players";

/// Whole-collection persistence for the player store.
pub trait CollectionPort: Send + Sync {
    /// The single key the collection lives under.
    fn key(&self) -> &str;

    /// Read the persisted blob. `Ok(None)` means nothing was ever written.
    fn load(&self) -> Result<Option<Vec<u8>>, PortError>;

    /// Durably replace the persisted blob.
    fn save(&self, bytes: &[u8]) -> Result<(), PortError>;
}

/// Marker port for stores without durable storage (e.g. rendering a static
/// view before any user interaction). A detached store never calls it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl CollectionPort for Detached {
    fn key(&self) -> &str {
        DEFAULT_KEY
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PortError> {
        Ok(None)
    }

    fn save(&self, _bytes: &[u8]) -> Result<(), PortError> {
        Ok(())
    }
}

impl<P: CollectionPort + ?Sized> CollectionPort for std::sync::Arc<P> {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PortError> {
        (**self).load()
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PortError> {
        (**self).save(bytes)
    }
}

impl<P: CollectionPort + ?Sized> CollectionPort for Box<P> {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PortError> {
        (**self).load()
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PortError> {
        (**self).save(bytes)
    }
}

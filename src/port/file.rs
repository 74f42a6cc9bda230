//! File-based CollectionPort implementation.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{CollectionPort, DEFAULT_KEY};
use crate::error::PortError;

/// Stores the collection as `<dir>/<key>.json`.
///
/// Writes go to `<key>.json.tmp` first, are synced to disk and then renamed
/// into place, so a crash mid-write leaves the previous collection intact.
pub struct FileCollection {
    key: String,
    base_dir: PathBuf,
}

impl FileCollection {
    /// Open a file collection under the default key, creating `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, PortError> {
        Self::with_key(base_dir, DEFAULT_KEY)
    }

    pub fn with_key(base_dir: impl AsRef<Path>, key: impl Into<String>) -> Result<Self, PortError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            key: key.into(),
            base_dir,
        })
    }

    /// Path of the collection file.
    pub fn path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.json", self.key))
    }
}

impl CollectionPort for FileCollection {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PortError> {
        let path = self.path();

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        tracing::debug!("Loaded {} bytes from {}", bytes.len(), path.display());

        Ok(Some(bytes))
    }

    fn save(&self, bytes: &[u8]) -> Result<(), PortError> {
        let path = self.path();
        let temp_path = path.with_extension("json.tmp");

        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved {} bytes to {}", bytes.len(), path.display());

        Ok(())
    }
}

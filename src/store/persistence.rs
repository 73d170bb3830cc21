//! Persistence layer for the durable recovery-state store

use crate::error::StorageError;
use crate::store::DurableStore;
use sled;
use std::path::Path;

/// Sled-based implementation of DurableStore
pub struct SledDurableStore {
    db: sled::Db,
}

impl SledDurableStore {
    /// Open a SledDurableStore at the given path
    ///
    /// The path can be a directory (sled will create a database there) or
    /// a file path (sled will use it as the database file).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Ok(Self { db })
    }

    fn flush(&self) -> Result<(), StorageError> {
        // Writes must be on disk, not just in sled's page cache, before a
        // reload can be expected to see them.
        self.db.flush().map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to flush store: {}", e),
            ))
        })?;
        Ok(())
    }
}

impl DurableStore for SledDurableStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to read key '{}': {}", key, e),
            ))
        })? {
            Some(value) => {
                let value =
                    String::from_utf8(value.to_vec()).map_err(|e| StorageError::InvalidValue {
                        key: key.to_string(),
                        reason: format!("not valid UTF-8: {}", e),
                    })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to write key '{}': {}", key, e),
                ))
            })?;
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes()).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to remove key '{}': {}", key, e),
            ))
        })?;
        self.flush()
    }
}

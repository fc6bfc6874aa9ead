//! In-memory bucket
//!
//! A `BTreeMap`-backed [`ReadWriteBucket`] with no transaction of its own.
//! Used as a reference model by unit tests and by subsystems that want to
//! exercise their migration steps without opening a store.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::traits::{ReadBucket, ReadWriteBucket};

/// In-memory namespace contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBucket {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryBucket {
    /// Create an empty bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the bucket
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the bucket holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all entries, in key order
    pub fn entries(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.entries
    }
}

impl ReadBucket for MemoryBucket {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn for_each(&self, f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>) -> Result<()> {
        for (k, v) in &self.entries {
            f(k, v)?;
        }
        Ok(())
    }
}

impl ReadWriteBucket for MemoryBucket {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

//! Core traits for namespace bucket abstraction
//!
//! This module defines the ReadBucket and ReadWriteBucket traits. A bucket is
//! the handle a subsystem gets onto its own namespace inside an open store
//! transaction. Migration steps and the version accessors only ever see these
//! traits, so the same code runs against the on-disk store and the in-memory
//! [`MemoryBucket`](crate::memory::MemoryBucket).

use crate::error::Result;

/// Read access to one namespace
///
/// Reads observe the writes already made through the same transaction.
pub trait ReadBucket {
    /// Get the value stored under `key`
    ///
    /// Returns None if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store read fails.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Visit every key/value pair in ascending key order
    ///
    /// Iteration stops at the first error returned by `f`, and that error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store read fails or `f` fails.
    fn for_each(&self, f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>) -> Result<()>;

    /// Check whether `key` is present
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store read fails.
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Read-write access to one namespace
///
/// Writes become visible to other transactions only when the enclosing store
/// transaction commits. If it aborts they are discarded.
pub trait ReadWriteBucket: ReadBucket {
    /// Insert or replace the value under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store write fails.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key`
    ///
    /// Returns true if the key was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store write fails.
    fn delete(&mut self, key: &[u8]) -> Result<bool>;
}

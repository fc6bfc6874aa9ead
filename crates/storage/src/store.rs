//! Store and transaction handles
//!
//! `Store` owns the embedded `redb` database. Each namespace is one table
//! keyed and valued by raw bytes, and is reached through a bucket handle
//! borrowed from an open transaction.
//!
//! ## Transaction API
//!
//! - [`Store::update`]: run a closure in a write transaction; commit on
//!   `Ok`, abort on `Err`
//! - [`Store::view`]: run a closure in a read transaction
//! - [`Store::dry_run`]: run a closure in a write transaction that is always
//!   aborted
//!
//! `redb` admits a single write transaction at a time, so two upgrade passes
//! can never interleave on the same store.

use std::path::{Path, PathBuf};

use redb::{ReadableTable, TableDefinition, TableHandle};
use tracing::{debug, info, warn};
use walletdb_core::{ReadBucket, ReadWriteBucket, Result, Version};

use crate::version::fetch_version;

fn namespace_table(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Options used when opening a [`Store`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Page cache size in bytes; `None` keeps the `redb` default
    pub cache_size_bytes: Option<usize>,
}

/// Embedded key-value store holding one table per namespace
pub struct Store {
    db: redb::Database,
    /// None for in-memory stores
    path: Option<PathBuf>,
}

impl Store {
    /// Open the store file at `path`, creating it if it does not exist
    ///
    /// # Errors
    ///
    /// Returns a store error if the file cannot be opened or is already open
    /// elsewhere.
    pub fn open<P: AsRef<Path>>(path: P, options: &StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut builder = redb::Builder::new();
        if let Some(bytes) = options.cache_size_bytes {
            builder.set_cache_size(bytes);
        }
        let db = builder.create(path)?;

        info!(target: "walletdb::store", path = %path.display(), "Store opened");

        Ok(Self {
            db,
            path: Some(path.to_path_buf()),
        })
    }

    /// Create a store that lives only in memory
    ///
    /// Data is lost when the store is dropped. Intended for tests.
    pub fn in_memory() -> Result<Self> {
        let db = redb::Builder::new().create_with_backend(redb::backends::InMemoryBackend::new())?;
        debug!(target: "walletdb::store", "In-memory store created");
        Ok(Self { db, path: None })
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Execute a closure inside a write transaction
    ///
    /// The transaction commits if the closure returns `Ok` and is aborted
    /// otherwise, in which case none of its writes are visible afterwards.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a store error from begin/commit.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&WriteTx) -> Result<T>,
    {
        let tx = WriteTx {
            txn: self.db.begin_write()?,
        };
        match f(&tx) {
            Ok(value) => {
                tx.txn.commit()?;
                debug!(target: "walletdb::store", "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                warn!(target: "walletdb::store", error = %e, "Transaction aborted");
                if let Err(abort_err) = tx.txn.abort() {
                    warn!(target: "walletdb::store", error = %abort_err, "Abort failed");
                }
                Err(e)
            }
        }
    }

    /// Execute a closure inside a write transaction that is always aborted
    ///
    /// Lets callers observe what a write would do without persisting it.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a store error from begin/abort.
    pub fn dry_run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&WriteTx) -> Result<T>,
    {
        let tx = WriteTx {
            txn: self.db.begin_write()?,
        };
        let result = f(&tx);
        tx.txn.abort()?;
        debug!(target: "walletdb::store", ok = result.is_ok(), "Dry-run transaction discarded");
        result
    }

    /// Execute a closure inside a read transaction
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a store error from begin.
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx) -> Result<T>,
    {
        let tx = ReadTx {
            txn: self.db.begin_read()?,
        };
        f(&tx)
    }

    /// Create an empty namespace if it does not exist yet
    pub fn create_namespace(&self, namespace: &str) -> Result<()> {
        self.update(|tx| tx.bucket(namespace).map(|_| ()))
    }

    /// Check whether a namespace exists
    pub fn namespace_exists(&self, namespace: &str) -> Result<bool> {
        self.view(|tx| Ok(tx.bucket(namespace)?.is_some()))
    }

    /// Names of all namespaces in the store
    pub fn namespaces(&self) -> Result<Vec<String>> {
        self.view(|tx| tx.namespaces())
    }

    /// Read the version of a namespace without opening a write transaction
    ///
    /// Returns None if the namespace does not exist.
    pub fn namespace_version(&self, namespace: &str) -> Result<Option<Version>> {
        self.view(|tx| match tx.bucket(namespace)? {
            Some(bucket) => fetch_version(&bucket).map(Some),
            None => Ok(None),
        })
    }
}

/// An open write transaction
pub struct WriteTx {
    txn: redb::WriteTransaction,
}

impl WriteTx {
    /// Open the bucket for `namespace`, creating the namespace if needed
    ///
    /// Only one bucket per namespace may be open at a time within a
    /// transaction.
    pub fn bucket(&self, namespace: &str) -> Result<RedbBucket<'_>> {
        let table = self.txn.open_table(namespace_table(namespace))?;
        Ok(RedbBucket { table })
    }

    /// Drop a namespace and all of its contents
    ///
    /// Returns true if the namespace existed.
    pub fn delete_namespace(&self, namespace: &str) -> Result<bool> {
        Ok(self.txn.delete_table(namespace_table(namespace))?)
    }
}

/// An open read transaction
pub struct ReadTx {
    txn: redb::ReadTransaction,
}

impl ReadTx {
    /// Open the bucket for `namespace`
    ///
    /// Returns None if the namespace does not exist.
    pub fn bucket(&self, namespace: &str) -> Result<Option<ReadOnlyBucket>> {
        match self.txn.open_table(namespace_table(namespace)) {
            Ok(table) => Ok(Some(ReadOnlyBucket { table })),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all namespaces visible to this transaction
    pub fn namespaces(&self) -> Result<Vec<String>> {
        Ok(self
            .txn
            .list_tables()?
            .map(|handle| handle.name().to_string())
            .collect())
    }
}

/// Read-write bucket backed by a `redb` table
pub struct RedbBucket<'txn> {
    table: redb::Table<'txn, &'static [u8], &'static [u8]>,
}

impl ReadBucket for RedbBucket<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn for_each(&self, f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>) -> Result<()> {
        for entry in self.table.iter()? {
            let (k, v) = entry?;
            f(k.value(), v.value())?;
        }
        Ok(())
    }
}

impl ReadWriteBucket for RedbBucket<'_> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.table.insert(key, value)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool> {
        Ok(self.table.remove(key)?.is_some())
    }
}

/// Read-only bucket backed by a `redb` table
pub struct ReadOnlyBucket {
    table: redb::ReadOnlyTable<&'static [u8], &'static [u8]>,
}

impl ReadBucket for ReadOnlyBucket {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn for_each(&self, f: &mut dyn FnMut(&[u8], &[u8]) -> Result<()>) -> Result<()> {
        for entry in self.table.iter()? {
            let (k, v) = entry?;
            f(k.value(), v.value())?;
        }
        Ok(())
    }
}

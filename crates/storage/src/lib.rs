//! Storage layer for walletdb
//!
//! This crate wraps the embedded `redb` database with:
//! - Store: open/close, closure-based read and write transactions
//! - RedbBucket / ReadOnlyBucket: one table per namespace behind the core bucket traits
//! - Version store: the reserved per-namespace version key

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod version;

pub use store::{ReadOnlyBucket, ReadTx, RedbBucket, Store, StoreOptions, WriteTx};
pub use version::{fetch_version, put_version, VERSION_KEY};

//! Error types for walletdb
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every failure aborts the migration pass that produced it; nothing here is
//! recovered locally. The variants exist so that callers opening the store can
//! tell a broken disk apart from running old software against new data.

use crate::version::Version;
use std::io;
use thiserror::Error;

/// Result type alias for walletdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for walletdb
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reported by the underlying key-value store
    #[error("Store error: {0}")]
    Store(#[from] redb::Error),

    /// The persisted version is newer than anything this build knows about
    #[error(
        "Downgrade not supported: {subsystem} is at version {stored}, \
         latest known version is {latest}"
    )]
    Downgrade {
        /// Name of the subsystem owning the namespace
        subsystem: String,
        /// Version found on disk
        stored: Version,
        /// Latest version in the registry
        latest: Version,
    },

    /// A migration step failed while rewriting namespace data
    #[error("Migration of {subsystem} from version {from} to {to} failed: {source}")]
    Migration {
        /// Name of the subsystem owning the namespace
        subsystem: String,
        /// Version the step started from
        from: Version,
        /// Version the step was moving to
        to: Version,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// The namespace is behind and automatic upgrades are disabled
    #[error(
        "Upgrade required: {subsystem} is at version {current}, \
         latest known version is {latest}"
    )]
    UpgradeRequired {
        /// Name of the subsystem owning the namespace
        subsystem: String,
        /// Version found on disk
        current: Version,
        /// Latest version in the registry
        latest: Version,
    },

    /// Programming or configuration defect (bad registry, bad config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Data corruption detected
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Failure raised by a subsystem's own code
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Create a free-form error, typically from inside a migration step
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Wrap a step failure with the subsystem name and version pair it belongs to
    pub fn migration(subsystem: impl Into<String>, from: Version, to: Version, source: Error) -> Self {
        Error::Migration {
            subsystem: subsystem.into(),
            from,
            to,
            source: Box::new(source),
        }
    }

    /// True for the downgrade case, which must never be retried
    pub fn is_downgrade(&self) -> bool {
        matches!(self, Error::Downgrade { .. })
    }

    /// True if the store file is still held open by another handle
    pub fn is_already_open(&self) -> bool {
        matches!(self, Error::Store(redb::Error::DatabaseAlreadyOpen))
    }
}

impl From<redb::DatabaseError> for Error {
    fn from(e: redb::DatabaseError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::TransactionError> for Error {
    fn from(e: redb::TransactionError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::TableError> for Error {
    fn from(e: redb::TableError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::StorageError> for Error {
    fn from(e: redb::StorageError) -> Self {
        Error::Store(e.into())
    }
}

impl From<redb::CommitError> for Error {
    fn from(e: redb::CommitError) -> Self {
        Error::Store(e.into())
    }
}

//! Wallet transaction manager namespace
//!
//! The transaction manager keeps the wallet's transaction index in its own
//! namespace. This crate defines that namespace's layout versions, its
//! migration manager, and the create/open checks run against it.
//!
//! # Layout
//!
//! ```text
//! b"version"  u32 big-endian   layout version
//! b"date"     u64 big-endian   creation time, unix seconds
//! b"bal"      u64 big-endian   mined balance, atoms
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod migrations;

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Utc};
use tracing::info;
use walletdb_core::{Error, ReadBucket, ReadWriteBucket, Result, Version};
use walletdb_migration::{upgrade, Manager, Subsystem};
use walletdb_storage::{fetch_version, VERSION_KEY};

pub use migrations::{
    latest_version, migration_manager, registry, MigrationManager, NAME, VERSIONS,
};

/// Namespace (store table) owned by the transaction manager
pub const NAMESPACE: &str = "wtxmgr";

/// Key holding the namespace creation time
pub const CREATE_DATE_KEY: &[u8] = b"date";

/// Key holding the mined balance
pub const MINED_BALANCE_KEY: &[u8] = b"bal";

/// The transaction manager as a registered subsystem
#[derive(Debug, Clone, Copy, Default)]
pub struct TxManager;

impl Subsystem for TxManager {
    fn namespace(&self) -> &str {
        NAMESPACE
    }

    fn manager<'a>(&self, ns: &'a mut dyn ReadWriteBucket) -> Result<Box<dyn Manager + 'a>> {
        Ok(Box::new(migration_manager(ns)?))
    }
}

/// Initialize a fresh transaction manager namespace at the latest layout
///
/// The namespace is brought up by the same migration steps an existing
/// namespace goes through, so a created namespace and an upgraded one are
/// indistinguishable.
///
/// # Errors
///
/// Returns a configuration error if the namespace already holds a version,
/// or any error from the migration pass.
pub fn create(ns: &mut dyn ReadWriteBucket) -> Result<()> {
    if ns.contains(VERSION_KEY)? {
        return Err(Error::configuration(
            "transaction manager namespace already exists",
        ));
    }

    let outcome = upgrade(&mut migration_manager(ns)?)?;

    info!(target: "walletdb::wtxmgr", version = %outcome.version(), "Transaction manager namespace created");
    Ok(())
}

/// Check that an existing namespace is usable by this build
///
/// Returns the namespace's version.
///
/// # Errors
///
/// - [`Error::Downgrade`] if the namespace is newer than this build
/// - [`Error::UpgradeRequired`] if migrations have not been run
pub fn open(ns: &dyn ReadBucket) -> Result<Version> {
    let current = fetch_version(ns)?;
    let latest = latest_version()?;

    if current > latest {
        return Err(Error::Downgrade {
            subsystem: NAME.to_string(),
            stored: current,
            latest,
        });
    }
    if current < latest {
        return Err(Error::UpgradeRequired {
            subsystem: NAME.to_string(),
            current,
            latest,
        });
    }
    Ok(current)
}

/// Creation time of the namespace, if it was recorded
///
/// # Errors
///
/// Returns a corruption error if the stored value is malformed.
pub fn creation_date(ns: &dyn ReadBucket) -> Result<Option<DateTime<Utc>>> {
    let bytes = match ns.get(CREATE_DATE_KEY)? {
        Some(bytes) => bytes,
        None => return Ok(None),
    };
    if bytes.len() != 8 {
        return Err(Error::corruption(format!(
            "creation date is {} bytes, expected 8",
            bytes.len()
        )));
    }
    let secs = i64::try_from(BigEndian::read_u64(&bytes))
        .map_err(|_| Error::corruption("creation date out of range"))?;
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| Error::corruption("creation date out of range"))
}

/// Mined balance recorded in the namespace
///
/// # Errors
///
/// Returns a corruption error if the stored value is malformed.
pub fn mined_balance(ns: &dyn ReadBucket) -> Result<u64> {
    match ns.get(MINED_BALANCE_KEY)? {
        None => Ok(0),
        Some(bytes) if bytes.len() == 8 => Ok(BigEndian::read_u64(&bytes)),
        Some(bytes) => Err(Error::corruption(format!(
            "mined balance is {} bytes, expected 8",
            bytes.len()
        ))),
    }
}

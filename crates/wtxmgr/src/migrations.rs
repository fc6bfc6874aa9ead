//! Schema versions of the transaction manager namespace
//!
//! The last entry of [`VERSIONS`] is the layout this build writes. A
//! namespace found at a lower version is brought forward by replaying the
//! later entries in order. A brand-new namespace starts at version 0 and goes
//! through the same steps, so version 1 is also where the initial layout is
//! written.

use byteorder::{BigEndian, ByteOrder};
use chrono::Utc;
use walletdb_core::{ReadWriteBucket, Result, Version};
use walletdb_migration::{MigrationVersion, NamespaceManager, Registry};

use crate::{CREATE_DATE_KEY, MINED_BALANCE_KEY};

/// Human-readable name of the transaction manager
pub const NAME: &str = "wallet transaction manager";

/// Every layout version of the transaction manager
pub static VERSIONS: &[MigrationVersion] =
    &[MigrationVersion::new(Version::new(1), Some(init_layout))];

/// Migration manager for the transaction manager namespace
pub type MigrationManager<'a> = NamespaceManager<'a>;

/// Validated registry over [`VERSIONS`]
///
/// # Errors
///
/// Returns a configuration error if [`VERSIONS`] is malformed.
pub fn registry() -> Result<Registry> {
    Registry::new(VERSIONS)
}

/// Latest layout version of the transaction manager
///
/// # Errors
///
/// Returns a configuration error if [`VERSIONS`] is malformed.
pub fn latest_version() -> Result<Version> {
    Ok(registry()?.latest())
}

/// Create a migration manager over the transaction manager's bucket
///
/// `ns` is the top-level bucket holding all of the transaction manager's
/// data.
///
/// # Errors
///
/// Returns a configuration error if [`VERSIONS`] is malformed.
pub fn migration_manager(ns: &mut dyn ReadWriteBucket) -> Result<MigrationManager<'_>> {
    Ok(NamespaceManager::new(NAME, ns, registry()?))
}

/// Version 1: record the creation time and a zero mined balance
fn init_layout(ns: &mut dyn ReadWriteBucket) -> Result<()> {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, Utc::now().timestamp().max(0) as u64);
    ns.put(CREATE_DATE_KEY, &buf)?;

    BigEndian::write_u64(&mut buf, 0);
    ns.put(MINED_BALANCE_KEY, &buf)
}

//! Migration manager contract
//!
//! A `Manager` is the capability object the driver operates through. It is
//! scoped to one namespace bucket inside an open write transaction, created
//! for a single upgrade pass and then dropped.
//!
//! The driver depends only on this trait, so every namespace type reuses the
//! same upgrade algorithm and supplies just its registry and the two version
//! accessors.
//!
//! ## Override handles
//!
//! `current_version` and `set_version` accept an optional bucket. When one is
//! given the read or write goes to that bucket (for example a handle from an
//! outer transaction); when `None` they fall back to the manager's own
//! namespace.

use walletdb_core::{ReadBucket, ReadWriteBucket, Result, Version};
use walletdb_storage::{fetch_version, put_version};

use crate::registry::Registry;

/// Per-namespace migration capability
pub trait Manager {
    /// Human-readable name of the subsystem, for logs and errors
    fn name(&self) -> &str;

    /// The read-write bucket holding this subsystem's data
    fn namespace(&mut self) -> &mut dyn ReadWriteBucket;

    /// Read the current version
    ///
    /// Reads from `ns` when given, otherwise from the manager's namespace.
    fn current_version(&self, ns: Option<&dyn ReadBucket>) -> Result<Version>;

    /// Persist a new version
    ///
    /// Writes to `ns` when given, otherwise to the manager's namespace.
    fn set_version(&mut self, ns: Option<&mut dyn ReadWriteBucket>, version: Version)
        -> Result<()>;

    /// The full version catalog of this namespace type
    fn registry(&self) -> &Registry;
}

/// Generic manager over any bucket and registry
///
/// Subsystems without special needs can use this directly instead of
/// writing their own [`Manager`] implementation.
pub struct NamespaceManager<'a> {
    name: String,
    ns: &'a mut dyn ReadWriteBucket,
    registry: Registry,
}

impl<'a> NamespaceManager<'a> {
    /// Create a manager for `ns`
    pub fn new(name: impl Into<String>, ns: &'a mut dyn ReadWriteBucket, registry: Registry) -> Self {
        Self {
            name: name.into(),
            ns,
            registry,
        }
    }
}

impl Manager for NamespaceManager<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&mut self) -> &mut dyn ReadWriteBucket {
        &mut *self.ns
    }

    fn current_version(&self, ns: Option<&dyn ReadBucket>) -> Result<Version> {
        match ns {
            Some(ns) => fetch_version(ns),
            None => fetch_version(&*self.ns),
        }
    }

    fn set_version(&mut self, ns: Option<&mut dyn ReadWriteBucket>, version: Version) -> Result<()> {
        match ns {
            Some(ns) => put_version(ns, version),
            None => put_version(&mut *self.ns, version),
        }
    }

    fn registry(&self) -> &Registry {
        &self.registry
    }
}

//! Store-level entry points
//!
//! A [`Subsystem`] names the namespace it owns and builds a [`Manager`] over
//! that namespace's bucket. The functions here open the transaction a pass
//! runs in, so callers opening a store only ever deal with "run pending
//! migrations for namespace N".

use walletdb_core::{ReadWriteBucket, Result};
use walletdb_storage::Store;

use crate::driver::{self, UpgradeOutcome, UpgradePlan};
use crate::manager::{Manager, NamespaceManager};
use crate::registry::{MigrationVersion, Registry};

/// A component that owns a namespace in the store
pub trait Subsystem {
    /// Name of the namespace (the store table) this subsystem owns
    fn namespace(&self) -> &str;

    /// Build the migration manager for this subsystem's bucket
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the subsystem's registry is invalid.
    fn manager<'a>(&self, ns: &'a mut dyn ReadWriteBucket) -> Result<Box<dyn Manager + 'a>>;
}

/// Subsystem described entirely by data
///
/// Useful for namespaces that need nothing beyond a static catalog.
#[derive(Debug, Clone, Copy)]
pub struct StaticSubsystem {
    /// Namespace (table) name
    pub namespace: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Version catalog
    pub versions: &'static [MigrationVersion],
}

impl Subsystem for StaticSubsystem {
    fn namespace(&self) -> &str {
        self.namespace
    }

    fn manager<'a>(&self, ns: &'a mut dyn ReadWriteBucket) -> Result<Box<dyn Manager + 'a>> {
        let registry = Registry::new(self.versions)?;
        Ok(Box::new(NamespaceManager::new(self.name, ns, registry)))
    }
}

/// Run pending migrations for one subsystem's namespace
///
/// The whole pass runs in a single write transaction. It commits only if
/// every step and every version write succeeds; otherwise the namespace is
/// left exactly as it was found.
///
/// # Errors
///
/// Any error from the pass; see [`driver::upgrade`].
pub fn run_migrations(store: &Store, subsystem: &dyn Subsystem) -> Result<UpgradeOutcome> {
    store.update(|tx| {
        let mut bucket = tx.bucket(subsystem.namespace())?;
        let mut mgr = subsystem.manager(&mut bucket)?;
        driver::upgrade(mgr.as_mut())
    })
}

/// Run a full pass for one subsystem and discard the result
///
/// Every migration step really executes, so failures surface exactly as
/// they would in [`run_migrations`], but nothing is committed.
pub fn dry_run_migrations(store: &Store, subsystem: &dyn Subsystem) -> Result<UpgradeOutcome> {
    store.dry_run(|tx| {
        let mut bucket = tx.bucket(subsystem.namespace())?;
        let mut mgr = subsystem.manager(&mut bucket)?;
        driver::upgrade(mgr.as_mut())
    })
}

/// Report the steps a pass would apply, without running any of them
pub fn plan_migrations(store: &Store, subsystem: &dyn Subsystem) -> Result<UpgradePlan> {
    store.dry_run(|tx| {
        let mut bucket = tx.bucket(subsystem.namespace())?;
        let mgr = subsystem.manager(&mut bucket)?;
        driver::plan(mgr.as_ref())
    })
}

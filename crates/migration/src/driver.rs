//! Migration driver
//!
//! Brings one namespace from its stored version to the latest version in its
//! registry:
//!
//! 1. Fetch the current version and the registry's latest version
//! 2. Equal: nothing to do
//! 3. Current newer than latest: fail with [`Error::Downgrade`], no writes
//! 4. Otherwise walk `registry.pending(current)` in ascending order, running
//!    each step's migration (if any) and then persisting its number
//!
//! The driver does not own a transaction. It must be called with a manager
//! whose bucket lives in a single write transaction covering the whole pass,
//! so that a failure at any step discards every earlier step too.
//! [`run_migrations`](crate::run_migrations) sets that up.

use tracing::{debug, info, warn};
use walletdb_core::{Error, Result, Version};

use crate::manager::Manager;

/// Result of a successful pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The namespace was already at the latest version
    UpToDate {
        /// The current (and latest) version
        version: Version,
    },
    /// One or more steps were applied
    Upgraded {
        /// Version before the pass
        from: Version,
        /// Version after the pass
        to: Version,
        /// Every version number the pass moved through, in order
        applied: Vec<Version>,
    },
}

impl UpgradeOutcome {
    /// Version the namespace is at after the pass
    pub fn version(&self) -> Version {
        match self {
            UpgradeOutcome::UpToDate { version } => *version,
            UpgradeOutcome::Upgraded { to, .. } => *to,
        }
    }

    /// True if the pass changed nothing
    pub fn is_noop(&self) -> bool {
        matches!(self, UpgradeOutcome::UpToDate { .. })
    }
}

/// What a pass would do, computed without writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradePlan {
    /// Subsystem name
    pub name: String,
    /// Stored version
    pub current: Version,
    /// Latest registered version
    pub target: Version,
    /// Version numbers that would be applied, in order
    pub steps: Vec<Version>,
}

impl UpgradePlan {
    /// True if the namespace is already current
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Compute the pending steps for a manager's namespace
///
/// # Errors
///
/// Returns [`Error::Downgrade`] if the stored version is newer than the
/// registry's latest, or a store error if the version cannot be read.
pub fn plan<M: Manager + ?Sized>(mgr: &M) -> Result<UpgradePlan> {
    let current = mgr.current_version(None)?;
    let registry = mgr.registry();
    let target = registry.latest();

    if current > target {
        return Err(Error::Downgrade {
            subsystem: mgr.name().to_string(),
            stored: current,
            latest: target,
        });
    }

    Ok(UpgradePlan {
        name: mgr.name().to_string(),
        current,
        target,
        steps: registry
            .pending(current)
            .iter()
            .map(|entry| entry.number)
            .collect(),
    })
}

/// Run every pending migration for one namespace
///
/// On error the caller must abort the enclosing transaction; steps already
/// applied in this pass are only undone by that abort.
///
/// # Errors
///
/// - [`Error::Downgrade`] if the stored version is newer than the latest
/// - [`Error::Migration`] if a step fails, naming the step's version pair
/// - store errors from reading or writing the version
pub fn upgrade<M: Manager + ?Sized>(mgr: &mut M) -> Result<UpgradeOutcome> {
    let name = mgr.name().to_string();
    let current = mgr.current_version(None)?;
    let target = mgr.registry().latest();

    if current == target {
        debug!(target: "walletdb::migration", namespace = %name, version = %current, "Namespace is up to date");
        return Ok(UpgradeOutcome::UpToDate { version: current });
    }

    if current > target {
        warn!(
            target: "walletdb::migration",
            namespace = %name,
            stored = %current,
            latest = %target,
            "Stored version is newer than this build supports"
        );
        return Err(Error::Downgrade {
            subsystem: name,
            stored: current,
            latest: target,
        });
    }

    let steps = mgr.registry().pending(current).to_vec();

    info!(
        target: "walletdb::migration",
        namespace = %name,
        from = %current,
        to = %target,
        steps = steps.len(),
        "Performing database schema migration"
    );

    let mut applied = Vec::with_capacity(steps.len());
    let mut version = current;
    for step in steps {
        if let Some(migration) = step.migration {
            if let Err(e) = migration(mgr.namespace()) {
                warn!(
                    target: "walletdb::migration",
                    namespace = %name,
                    from = %version,
                    to = %step.number,
                    error = %e,
                    "Migration step failed"
                );
                return Err(Error::migration(name, version, step.number, e));
            }
        }
        mgr.set_version(None, step.number)?;

        debug!(
            target: "walletdb::migration",
            namespace = %name,
            from = %version,
            to = %step.number,
            rewrote = step.migration.is_some(),
            "Migration step applied"
        );
        version = step.number;
        applied.push(step.number);
    }

    info!(target: "walletdb::migration", namespace = %name, version = %version, "Migration complete");

    Ok(UpgradeOutcome::Upgraded {
        from: current,
        to: version,
        applied,
    })
}

/// Run [`upgrade`] over several managers in order
///
/// Stops at the first failure.
pub fn upgrade_all(managers: &mut [&mut dyn Manager]) -> Result<Vec<UpgradeOutcome>> {
    let mut outcomes = Vec::with_capacity(managers.len());
    for mgr in managers.iter_mut() {
        outcomes.push(upgrade(&mut **mgr)?);
    }
    Ok(outcomes)
}

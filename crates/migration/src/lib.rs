//! Versioned namespace migrations
//!
//! This crate implements the upgrade pass every namespace goes through when
//! the store is opened:
//! - Registry: ordered, validated catalog of versions and migration steps
//! - Manager: per-namespace capability the driver operates through
//! - Driver: walks pending steps in order and advances the stored version
//! - Subsystem: store-level entry points that wrap a pass in one transaction
//!
//! # Example
//!
//! ```ignore
//! use walletdb_migration::{run_migrations, MigrationVersion, StaticSubsystem};
//!
//! static VERSIONS: &[MigrationVersion] = &[MigrationVersion::new(Version::new(1), None)];
//!
//! let subsystem = StaticSubsystem {
//!     namespace: "addrmgr",
//!     name: "address manager",
//!     versions: VERSIONS,
//! };
//! let outcome = run_migrations(&store, &subsystem)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod driver;
pub mod manager;
pub mod registry;
pub mod subsystem;

pub use driver::{plan, upgrade, upgrade_all, UpgradeOutcome, UpgradePlan};
pub use manager::{Manager, NamespaceManager};
pub use registry::{latest_version, versions_to_apply, MigrationFn, MigrationVersion, Registry};
pub use subsystem::{
    dry_run_migrations, plan_migrations, run_migrations, StaticSubsystem, Subsystem,
};

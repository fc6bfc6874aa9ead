//! Shared test utilities for the root integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use tempfile::TempDir;
pub use walletdb::{
    wtxmgr, Error, MigrationVersion, ReadBucket, ReadWriteBucket, Result, StaticSubsystem, Store,
    StoreOptions, Subsystem, UpgradeOutcome, Version, WalletDb, WalletDbConfig,
};

// ============================================================================
// Initialization
// ============================================================================

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ============================================================================
// Subsystem catalogs
// ============================================================================

pub const ADDR_NS: &str = "addrmgr";
pub const ADDR_NAME: &str = "address manager";
pub const SCOPE_KEY: &[u8] = b"scope";

fn add_scope(ns: &mut dyn ReadWriteBucket) -> Result<()> {
    ns.put(SCOPE_KEY, b"bip44")
}

fn refuse(_ns: &mut dyn ReadWriteBucket) -> Result<()> {
    Err(Error::other("address index is inconsistent"))
}

pub static ADDR_V1: &[MigrationVersion] = &[MigrationVersion::new(Version::new(1), None)];

pub static ADDR_V2: &[MigrationVersion] = &[
    MigrationVersion::new(Version::new(1), None),
    MigrationVersion::new(Version::new(2), Some(add_scope)),
];

pub static ADDR_BROKEN_V2: &[MigrationVersion] = &[
    MigrationVersion::new(Version::new(1), None),
    MigrationVersion::new(Version::new(2), Some(refuse)),
];

pub static ADDR_DUPLICATE: &[MigrationVersion] = &[
    MigrationVersion::new(Version::new(1), None),
    MigrationVersion::new(Version::new(2), Some(add_scope)),
    MigrationVersion::new(Version::new(2), None),
];

pub static ADDR_UNSORTED: &[MigrationVersion] = &[
    MigrationVersion::new(Version::new(2), Some(add_scope)),
    MigrationVersion::new(Version::new(1), None),
];

pub fn addr_manager(versions: &'static [MigrationVersion]) -> StaticSubsystem {
    StaticSubsystem {
        namespace: ADDR_NS,
        name: ADDR_NAME,
        versions,
    }
}

// ============================================================================
// TestWallet - data directory plus open helpers
// ============================================================================

/// Temporary wallet data directory.
pub struct TestWallet {
    pub dir: TempDir,
}

impl TestWallet {
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("wallet.db")
    }

    /// Open with the default subsystems and the on-disk config.
    pub fn open(&self) -> Result<Arc<WalletDb>> {
        WalletDb::open(self.path())
    }

    /// Open with the transaction manager plus the given address catalog.
    pub fn open_with_addr(
        &self,
        cfg: WalletDbConfig,
        versions: &'static [MigrationVersion],
    ) -> Result<Arc<WalletDb>> {
        let addr = addr_manager(versions);
        let subsystems: [&dyn Subsystem; 2] = [&wtxmgr::TxManager, &addr];
        WalletDb::open_with_subsystems(self.path(), cfg, &subsystems)
    }

    /// Read a key straight from the store file, bypassing any migration.
    pub fn peek(&self, namespace: &str, key: &[u8]) -> Option<Vec<u8>> {
        let store = Store::open(self.store_path(), &StoreOptions::default()).unwrap();
        store
            .view(|tx| match tx.bucket(namespace)? {
                Some(ns) => ns.get(key),
                None => Ok(None),
            })
            .unwrap()
    }

    /// Stored version of a namespace, read straight from the store file.
    pub fn version(&self, namespace: &str) -> Option<Version> {
        let store = Store::open(self.store_path(), &StoreOptions::default()).unwrap();
        store.namespace_version(namespace).unwrap()
    }
}

pub fn manual_upgrades() -> WalletDbConfig {
    WalletDbConfig {
        auto_upgrade: false,
        ..WalletDbConfig::default()
    }
}

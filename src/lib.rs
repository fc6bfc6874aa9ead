//! walletdb - versioned wallet storage on an embedded key-value store
//!
//! Every wallet subsystem keeps its data in its own namespace of the store
//! and records the layout version of that namespace under a reserved key.
//! Opening a [`WalletDb`] brings each registered namespace up to the layout
//! this build understands, one all-or-nothing pass per namespace.
//!
//! # Quick Start
//!
//! ```ignore
//! use walletdb::WalletDb;
//!
//! // Creates the directory, a default walletdb.toml, and wallet.db
//! let db = WalletDb::open("/path/to/wallet")?;
//!
//! let version = db.namespace_version(walletdb::wtxmgr::NAMESPACE)?;
//! ```
//!
//! # Architecture
//!
//! - `walletdb-core`: error type, [`Version`], bucket traits
//! - `walletdb-storage`: the `redb`-backed [`Store`] and the version key
//! - `walletdb-migration`: registry, manager contract and upgrade driver
//! - `walletdb-wtxmgr`: the transaction manager namespace

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod registry;

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

pub use config::{WalletDbConfig, CONFIG_FILE_NAME};
pub use registry::OPEN_WALLETS;
use registry::Registration;
pub use walletdb_core::{Error, MemoryBucket, ReadBucket, ReadWriteBucket, Result, Version};
pub use walletdb_migration::{
    dry_run_migrations, plan_migrations, run_migrations, Manager, MigrationFn, MigrationVersion,
    Registry, StaticSubsystem, Subsystem, UpgradeOutcome, UpgradePlan,
};
pub use walletdb_storage::{Store, StoreOptions, VERSION_KEY};

/// The transaction manager namespace
pub use walletdb_wtxmgr as wtxmgr;

/// Subsystems opened by [`WalletDb::open`] and [`WalletDb::open_with_config`]
pub fn default_subsystems() -> [&'static dyn Subsystem; 1] {
    [&wtxmgr::TxManager]
}

/// Attempts to reopen a store file still being closed by a dropped instance
const REOPEN_ATTEMPTS: u32 = 50;
const REOPEN_BACKOFF: Duration = Duration::from_millis(10);

/// An open wallet database whose namespaces are all at their latest layout
pub struct WalletDb {
    store: Store,
    config: WalletDbConfig,
    upgrades: Vec<(String, UpgradeOutcome)>,
    /// None for in-memory databases. Fields drop in order, so the entry is
    /// released after the store file is closed.
    registration: Option<Registration>,
}

impl WalletDb {
    /// Open the wallet database in `path`, creating it if needed
    ///
    /// Reads `walletdb.toml` from the directory, writing the default file
    /// first if there is none, then opens the store and runs pending
    /// migrations for every default subsystem.
    ///
    /// # Errors
    ///
    /// Any failure is fatal to the open: a bad config file, a store error, a
    /// namespace newer than this build ([`Error::Downgrade`]), a failing
    /// migration step, or [`Error::UpgradeRequired`] when automatic upgrades
    /// are disabled.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let data_dir = path.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        WalletDbConfig::write_default_if_missing(&config_path)?;
        let cfg = WalletDbConfig::from_file(&config_path)?;

        Self::open_with_subsystems(data_dir, cfg, &default_subsystems())
    }

    /// Open with an explicit configuration
    ///
    /// The supplied config is written to `walletdb.toml` so that later
    /// [`WalletDb::open`] calls pick up the same settings.
    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: WalletDbConfig) -> Result<Arc<Self>> {
        let data_dir = path.as_ref();
        cfg.validate()?;
        std::fs::create_dir_all(data_dir)?;
        cfg.write_to_file(&data_dir.join(CONFIG_FILE_NAME))?;

        Self::open_with_subsystems(data_dir, cfg, &default_subsystems())
    }

    /// Open with an explicit configuration and set of subsystems
    ///
    /// Subsystems are brought up in the order given. If the directory is
    /// already open in this process the running instance is returned and
    /// neither `cfg` nor `subsystems` are consulted.
    pub fn open_with_subsystems<P: AsRef<Path>>(
        path: P,
        cfg: WalletDbConfig,
        subsystems: &[&dyn Subsystem],
    ) -> Result<Arc<Self>> {
        cfg.validate()?;
        let data_dir = path.as_ref();
        std::fs::create_dir_all(data_dir)?;
        let canonical_path = data_dir.canonicalize()?;

        // Held for the whole open so two threads cannot both open the file.
        let mut registry = OPEN_WALLETS.lock();

        // A dead entry means the previous instance may still be closing its
        // store file.
        let closing = match registry.get(&canonical_path) {
            Some(weak) => match weak.upgrade() {
                Some(db) => {
                    info!(target: "walletdb::db", path = ?canonical_path, "Returning existing database instance");
                    return Ok(db);
                }
                None => true,
            },
            None => false,
        };

        let store = open_store(&canonical_path.join(&cfg.file_name), &cfg, closing)?;
        let upgrades = bring_up(&store, &cfg, subsystems)?;

        let db = Arc::new(Self {
            store,
            config: cfg,
            upgrades,
            registration: Some(Registration::new(canonical_path.clone())),
        });
        registry.insert(canonical_path.clone(), Arc::downgrade(&db));

        info!(target: "walletdb::db", path = ?canonical_path, "Database opened");
        Ok(db)
    }

    /// Open a database that lives only in memory, with the default subsystems
    pub fn in_memory() -> Result<Self> {
        Self::in_memory_with_subsystems(&default_subsystems())
    }

    /// Open an in-memory database with the given subsystems
    pub fn in_memory_with_subsystems(subsystems: &[&dyn Subsystem]) -> Result<Self> {
        let config = WalletDbConfig::default();
        let store = Store::in_memory()?;
        let upgrades = bring_up(&store, &config, subsystems)?;
        Ok(Self {
            store,
            config,
            upgrades,
            registration: None,
        })
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Configuration the database was opened with
    pub fn config(&self) -> &WalletDbConfig {
        &self.config
    }

    /// Canonical data directory, None for in-memory databases
    pub fn data_dir(&self) -> Option<&Path> {
        self.registration.as_ref().map(Registration::dir)
    }

    /// What the open did to each namespace, in subsystem order
    pub fn upgrades(&self) -> &[(String, UpgradeOutcome)] {
        &self.upgrades
    }

    /// Stored version of a namespace, None if it does not exist
    pub fn namespace_version(&self, namespace: &str) -> Result<Option<Version>> {
        self.store.namespace_version(namespace)
    }

    /// Report what a pass would do for `subsystem` without running it
    pub fn plan(&self, subsystem: &dyn Subsystem) -> Result<UpgradePlan> {
        plan_migrations(&self.store, subsystem)
    }
}

impl std::fmt::Debug for WalletDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletDb")
            .field("data_dir", &self.data_dir())
            .field("config", &self.config)
            .field("upgrades", &self.upgrades)
            .finish()
    }
}

/// Open the store file, waiting out a previous instance that is closing it
fn open_store(path: &Path, cfg: &WalletDbConfig, closing: bool) -> Result<Store> {
    let options = cfg.store_options();
    let mut attempt = 1;
    loop {
        match Store::open(path, &options) {
            Err(e) if closing && e.is_already_open() && attempt < REOPEN_ATTEMPTS => {
                debug!(target: "walletdb::db", path = %path.display(), attempt, "Store file still closing, retrying");
                attempt += 1;
                thread::sleep(REOPEN_BACKOFF);
            }
            result => return result,
        }
    }
}

/// Bring every subsystem's namespace to its latest version
///
/// With `auto_upgrade` off an existing namespace that is behind fails the
/// open instead; a namespace that does not exist yet has nothing to upgrade
/// and is always initialized.
fn bring_up(
    store: &Store,
    cfg: &WalletDbConfig,
    subsystems: &[&dyn Subsystem],
) -> Result<Vec<(String, UpgradeOutcome)>> {
    let mut upgrades = Vec::with_capacity(subsystems.len());

    for subsystem in subsystems {
        let namespace = subsystem.namespace();
        let outcome = if cfg.auto_upgrade || !store.namespace_exists(namespace)? {
            run_migrations(store, *subsystem)?
        } else {
            let plan = plan_migrations(store, *subsystem)?;
            if !plan.is_noop() {
                return Err(Error::UpgradeRequired {
                    subsystem: plan.name,
                    current: plan.current,
                    latest: plan.target,
                });
            }
            UpgradeOutcome::UpToDate {
                version: plan.current,
            }
        };
        debug!(target: "walletdb::db", namespace, version = %outcome.version(), "Namespace ready");
        upgrades.push((namespace.to_string(), outcome));
    }

    Ok(upgrades)
}

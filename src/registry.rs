//! Process-wide registry of open wallet databases
//!
//! `redb` refuses to open a file that is already open, so a second
//! [`WalletDb::open`](crate::WalletDb::open) on the same directory returns
//! the instance that is already running. Entries are weak and are removed
//! once the database and its store file are closed.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Weak;

use crate::WalletDb;

/// Open databases keyed by canonical data directory
pub static OPEN_WALLETS: Lazy<Mutex<HashMap<PathBuf, Weak<WalletDb>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registry entry owned by an open database
///
/// Must be declared after the store in [`WalletDb`] so that the entry is
/// only released once the store file is closed.
#[derive(Debug)]
pub(crate) struct Registration {
    dir: PathBuf,
}

impl Registration {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut registry = OPEN_WALLETS.lock();
        // A later open may already have replaced this entry.
        if registry
            .get(&self.dir)
            .is_some_and(|weak| weak.strong_count() == 0)
        {
            registry.remove(&self.dir);
        }
    }
}

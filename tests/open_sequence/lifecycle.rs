//! Config file handling and instance sharing

use std::sync::Arc;
use std::thread;

use crate::common::*;

#[test]
fn config_file_controls_later_opens() {
    let wallet = TestWallet::new();
    drop(wallet.open_with_addr(WalletDbConfig::default(), ADDR_V1).unwrap());

    std::fs::write(
        wallet.path().join(walletdb::CONFIG_FILE_NAME),
        "auto_upgrade = false\n",
    )
    .unwrap();

    // Default subsystems only: the transaction manager is current.
    let db = wallet.open().unwrap();
    assert!(!db.config().auto_upgrade);
}

#[test]
fn malformed_config_fails_open() {
    let wallet = TestWallet::new();
    std::fs::write(
        wallet.path().join(walletdb::CONFIG_FILE_NAME),
        "file_name = 7\n",
    )
    .unwrap();

    let err = wallet.open().unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(!wallet.store_path().exists());
}

#[test]
fn concurrent_opens_share_one_instance() {
    let wallet = TestWallet::new();
    let path = wallet.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            thread::spawn(move || WalletDb::open(path).unwrap())
        })
        .collect();
    let dbs: Vec<Arc<WalletDb>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for db in &dbs[1..] {
        assert!(Arc::ptr_eq(&dbs[0], db));
    }
}

#[test]
fn transaction_manager_is_usable_after_open() {
    let wallet = TestWallet::new();
    let db = wallet.open().unwrap();

    let version = db
        .store()
        .view(|tx| match tx.bucket(wtxmgr::NAMESPACE)? {
            Some(ns) => wtxmgr::open(&ns),
            None => Err(Error::other("namespace missing")),
        })
        .unwrap();
    assert_eq!(version, wtxmgr::latest_version().unwrap());
}

#[test]
fn reopen_while_previous_instance_closes() {
    let wallet = TestWallet::new();
    drop(wallet.open().unwrap());
    let path = wallet.path().to_path_buf();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let path = path.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let db = WalletDb::open(&path).unwrap();
                    assert!(db.upgrades().iter().all(|(_, outcome)| outcome.is_noop()));
                    drop(db);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

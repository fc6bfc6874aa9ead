//! Opening with `auto_upgrade = true` (the default)

use crate::common::*;

#[test]
fn fresh_directory_initializes_every_namespace() {
    let wallet = TestWallet::new();
    let db = wallet
        .open_with_addr(WalletDbConfig::default(), ADDR_V2)
        .unwrap();

    let names: Vec<&str> = db.upgrades().iter().map(|(ns, _)| ns.as_str()).collect();
    assert_eq!(names, vec![wtxmgr::NAMESPACE, ADDR_NS]);
    assert_eq!(
        db.namespace_version(wtxmgr::NAMESPACE).unwrap(),
        Some(wtxmgr::latest_version().unwrap())
    );
    assert_eq!(db.namespace_version(ADDR_NS).unwrap(), Some(Version::new(2)));
}

#[test]
fn newer_release_upgrades_on_open() {
    let wallet = TestWallet::new();
    drop(wallet.open_with_addr(WalletDbConfig::default(), ADDR_V1).unwrap());
    assert_eq!(wallet.peek(ADDR_NS, SCOPE_KEY), None);

    let db = wallet
        .open_with_addr(WalletDbConfig::default(), ADDR_V2)
        .unwrap();

    assert_eq!(
        db.upgrades()[1].1,
        UpgradeOutcome::Upgraded {
            from: Version::new(1),
            to: Version::new(2),
            applied: vec![Version::new(2)],
        }
    );
    assert!(db.upgrades()[0].1.is_noop());
    drop(db);
    assert_eq!(wallet.peek(ADDR_NS, SCOPE_KEY), Some(b"bip44".to_vec()));
}

#[test]
fn reopen_is_noop() {
    let wallet = TestWallet::new();
    drop(wallet.open().unwrap());

    let db = wallet.open().unwrap();
    assert!(db.upgrades().iter().all(|(_, outcome)| outcome.is_noop()));
}

#[test]
fn failing_step_fails_open_and_keeps_old_version() {
    let wallet = TestWallet::new();
    drop(wallet.open_with_addr(WalletDbConfig::default(), ADDR_V1).unwrap());

    let err = wallet
        .open_with_addr(WalletDbConfig::default(), ADDR_BROKEN_V2)
        .unwrap_err();

    match err {
        Error::Migration {
            subsystem, from, to, ..
        } => {
            assert_eq!(subsystem, ADDR_NAME);
            assert_eq!(from, Version::new(1));
            assert_eq!(to, Version::new(2));
        }
        other => panic!("expected migration error, got {other:?}"),
    }
    assert_eq!(wallet.version(ADDR_NS), Some(Version::new(1)));
}

#[test]
fn older_release_is_refused() {
    let wallet = TestWallet::new();
    drop(wallet.open_with_addr(WalletDbConfig::default(), ADDR_V2).unwrap());

    let err = wallet
        .open_with_addr(WalletDbConfig::default(), ADDR_V1)
        .unwrap_err();

    assert!(err.is_downgrade());
    assert_eq!(wallet.version(ADDR_NS), Some(Version::new(2)));
    assert_eq!(wallet.peek(ADDR_NS, SCOPE_KEY), Some(b"bip44".to_vec()));
}

#[test]
fn malformed_catalog_fails_open_without_writes() {
    for versions in [ADDR_DUPLICATE, ADDR_UNSORTED] {
        let wallet = TestWallet::new();

        let err = wallet
            .open_with_addr(WalletDbConfig::default(), versions)
            .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
        // The transaction manager came up before the failing subsystem.
        assert_eq!(
            wallet.version(wtxmgr::NAMESPACE),
            Some(wtxmgr::latest_version().unwrap())
        );
        assert_eq!(wallet.version(ADDR_NS), None);
    }
}

#[test]
fn opened_namespace_has_full_transaction_manager_layout() {
    let wallet = TestWallet::new();
    drop(wallet.open().unwrap());

    assert!(wallet.peek(wtxmgr::NAMESPACE, wtxmgr::CREATE_DATE_KEY).is_some());
    assert_eq!(
        wallet.peek(wtxmgr::NAMESPACE, wtxmgr::MINED_BALANCE_KEY),
        Some(vec![0; 8])
    );
}

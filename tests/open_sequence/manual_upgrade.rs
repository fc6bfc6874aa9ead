//! Opening with `auto_upgrade = false`

use crate::common::*;

#[test]
fn missing_namespaces_are_still_created() {
    let wallet = TestWallet::new();
    let db = wallet.open_with_addr(manual_upgrades(), ADDR_V2).unwrap();

    assert_eq!(db.namespace_version(ADDR_NS).unwrap(), Some(Version::new(2)));
}

#[test]
fn behind_namespace_requires_upgrade() {
    let wallet = TestWallet::new();
    drop(wallet.open_with_addr(WalletDbConfig::default(), ADDR_V1).unwrap());

    let err = wallet.open_with_addr(manual_upgrades(), ADDR_V2).unwrap_err();

    match err {
        Error::UpgradeRequired {
            subsystem,
            current,
            latest,
        } => {
            assert_eq!(subsystem, ADDR_NAME);
            assert_eq!(current, Version::new(1));
            assert_eq!(latest, Version::new(2));
        }
        other => panic!("expected upgrade-required error, got {other:?}"),
    }
    assert_eq!(wallet.version(ADDR_NS), Some(Version::new(1)));
    assert_eq!(wallet.peek(ADDR_NS, SCOPE_KEY), None);
}

#[test]
fn current_namespaces_open_normally() {
    let wallet = TestWallet::new();
    drop(wallet.open_with_addr(WalletDbConfig::default(), ADDR_V2).unwrap());

    let db = wallet.open_with_addr(manual_upgrades(), ADDR_V2).unwrap();
    assert!(db.upgrades().iter().all(|(_, outcome)| outcome.is_noop()));
}

#[test]
fn newer_namespace_is_still_a_downgrade() {
    let wallet = TestWallet::new();
    drop(wallet.open_with_addr(WalletDbConfig::default(), ADDR_V2).unwrap());

    let err = wallet.open_with_addr(manual_upgrades(), ADDR_V1).unwrap_err();
    assert!(err.is_downgrade());
}

#[test]
fn plan_reports_pending_steps_from_open_database() {
    let wallet = TestWallet::new();
    let db = wallet
        .open_with_addr(WalletDbConfig::default(), ADDR_V1)
        .unwrap();

    let plan = db.plan(&addr_manager(ADDR_V2)).unwrap();
    assert_eq!(plan.current, Version::new(1));
    assert_eq!(plan.steps, vec![Version::new(2)]);
    assert_eq!(db.namespace_version(ADDR_NS).unwrap(), Some(Version::new(1)));
}

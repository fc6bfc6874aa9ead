//! Store-open sequence tests
//!
//! Opening a wallet directory brings every registered namespace to the
//! latest layout this build knows, or fails the open as a whole.

#[path = "../common/mod.rs"]
mod common;

mod auto_upgrade;
mod lifecycle;
mod manual_upgrade;

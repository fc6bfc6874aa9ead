//! Version store
//!
//! Reads and writes the single version number each namespace keeps under a
//! reserved key. These are plain accessors: monotonicity is enforced by the
//! migration driver, not here.
//!
//! # Layout
//!
//! ```text
//! key:   b"version"
//! value: u32, big-endian, 4 bytes
//! ```
//!
//! A missing key means the namespace has never been migrated (version 0).

use byteorder::{BigEndian, ByteOrder};
use walletdb_core::{Error, ReadBucket, ReadWriteBucket, Result, Version};

/// Reserved key holding a namespace's version
pub const VERSION_KEY: &[u8] = b"version";

/// Read the persisted version of a namespace
///
/// Returns [`Version::ZERO`] if the key is absent.
///
/// # Errors
///
/// Returns a store error if the read fails, or a corruption error if the
/// stored value is not exactly four bytes.
pub fn fetch_version<B: ReadBucket + ?Sized>(ns: &B) -> Result<Version> {
    match ns.get(VERSION_KEY)? {
        None => Ok(Version::ZERO),
        Some(bytes) if bytes.len() == Version::ENCODED_LEN => {
            Ok(Version::new(BigEndian::read_u32(&bytes)))
        }
        Some(bytes) => Err(Error::corruption(format!(
            "namespace version is {} bytes, expected {}",
            bytes.len(),
            Version::ENCODED_LEN
        ))),
    }
}

/// Persist the version of a namespace
///
/// # Errors
///
/// Returns a store error if the write fails (read-only or closed transaction).
pub fn put_version<B: ReadWriteBucket + ?Sized>(ns: &mut B, version: Version) -> Result<()> {
    let mut buf = [0u8; Version::ENCODED_LEN];
    BigEndian::write_u32(&mut buf, version.as_u32());
    ns.put(VERSION_KEY, &buf)
}

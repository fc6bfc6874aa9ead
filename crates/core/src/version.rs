//! Namespace schema version
//!
//! A `Version` tags the schema generation of one namespace. Within a namespace
//! it only ever moves forward, and a namespace with no stored version is at
//! [`Version::ZERO`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema version of a namespace
///
/// ## Invariants
///
/// - Monotonically non-decreasing over the lifetime of a namespace
/// - Never skips backward
/// - Absence of the stored key means version 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u32);

impl Version {
    /// Version of a freshly created, unmigrated namespace
    pub const ZERO: Version = Version(0);

    /// Encoded width of a persisted version, in bytes
    pub const ENCODED_LEN: usize = 4;

    /// Create a version from its number
    pub const fn new(number: u32) -> Self {
        Version(number)
    }

    /// Get the numeric value
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Check if this is the unmigrated version
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Version {
    fn from(number: u32) -> Self {
        Version(number)
    }
}

impl From<Version> for u32 {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Migration registry
//!
//! The ordered catalog of versions a namespace type knows about. Each entry
//! pairs a version number with an optional migration step that rewrites the
//! namespace from the previous version's layout to this one.
//!
//! Catalogs are usually `static` slices:
//!
//! ```ignore
//! static VERSIONS: &[MigrationVersion] = &[
//!     MigrationVersion::new(Version::new(1), None),
//!     MigrationVersion::new(Version::new(2), Some(split_outputs)),
//! ];
//! let registry = Registry::new(VERSIONS)?;
//! ```

use std::borrow::Cow;
use std::fmt;

use walletdb_core::{Error, ReadWriteBucket, Result, Version};

/// A migration step
///
/// Receives the namespace bucket inside the upgrade transaction and rewrites
/// it to the layout of the version it is registered under. It runs at most
/// once per namespace.
pub type MigrationFn = fn(&mut dyn ReadWriteBucket) -> Result<()>;

/// One entry of a registry
#[derive(Clone, Copy)]
pub struct MigrationVersion {
    /// Version reached once this entry is applied
    pub number: Version,
    /// Data rewrite, or None if the version needs no data change
    pub migration: Option<MigrationFn>,
}

impl MigrationVersion {
    /// Create a registry entry
    pub const fn new(number: Version, migration: Option<MigrationFn>) -> Self {
        Self { number, migration }
    }
}

impl fmt::Debug for MigrationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationVersion")
            .field("number", &self.number)
            .field("has_migration", &self.migration.is_some())
            .finish()
    }
}

/// Validated, immutable catalog of migration entries
///
/// ## Invariants
///
/// - At least one entry
/// - Entries strictly increasing by `number` (so no duplicates)
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Cow<'static, [MigrationVersion]>,
}

impl Registry {
    /// Build a registry, validating the catalog
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the catalog is empty, contains a
    /// duplicate number, or is not sorted ascending.
    pub fn new(entries: impl Into<Cow<'static, [MigrationVersion]>>) -> Result<Self> {
        let entries = entries.into();
        validate(&entries)?;
        Ok(Self { entries })
    }

    /// The latest version this registry knows about
    pub fn latest(&self) -> Version {
        match self.entries.last() {
            Some(entry) => entry.number,
            None => unreachable!("registry constructed without entries"),
        }
    }

    /// All entries strictly newer than `from`, in ascending order
    ///
    /// Empty if `from >= latest()`.
    pub fn pending(&self, from: Version) -> &[MigrationVersion] {
        let start = self.entries.partition_point(|entry| entry.number <= from);
        &self.entries[start..]
    }

    /// The full catalog
    pub fn entries(&self) -> &[MigrationVersion] {
        &self.entries
    }

    /// Check whether `version` is one of the registered numbers
    pub fn contains(&self, version: Version) -> bool {
        self.entries
            .binary_search_by(|entry| entry.number.cmp(&version))
            .is_ok()
    }
}

fn validate(entries: &[MigrationVersion]) -> Result<()> {
    if entries.is_empty() {
        return Err(Error::configuration("migration registry has no versions"));
    }
    for pair in entries.windows(2) {
        let (prev, next) = (pair[0].number, pair[1].number);
        if prev == next {
            return Err(Error::configuration(format!(
                "migration registry lists version {} twice",
                next
            )));
        }
        if prev > next {
            return Err(Error::configuration(format!(
                "migration registry is out of order: version {} follows {}",
                next, prev
            )));
        }
    }
    Ok(())
}

/// Latest version of an unvalidated catalog
///
/// Returns None for an empty catalog.
pub fn latest_version(entries: &[MigrationVersion]) -> Option<Version> {
    entries.iter().map(|entry| entry.number).max()
}

/// Entries of an unvalidated catalog that are newer than `current`
///
/// Order of the input is preserved.
pub fn versions_to_apply(current: Version, entries: &[MigrationVersion]) -> Vec<MigrationVersion> {
    entries
        .iter()
        .filter(|entry| entry.number > current)
        .copied()
        .collect()
}

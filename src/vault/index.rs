//! Display references versus storage positions.
//!
//! `list` and `search` print numbers next to entries.  Those numbers are
//! `DisplayRef`s: whatever the user types back.  The entry's real place in
//! the vault is a `StoragePosition`.  A `ResultSet` remembers the last
//! listing so a reference can be resolved against it, and every resolved
//! position is bounds-checked against the freshly loaded vault.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::errors::{Result, VaultError};

use super::entry::Entry;
use super::model::Vault;

/// A 1-based position within the current vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoragePosition(NonZeroUsize);

impl StoragePosition {
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    /// From a 1-based number; `None` for zero.
    pub fn new(one_based: usize) -> Option<Self> {
        NonZeroUsize::new(one_based).map(Self)
    }

    /// From a 0-based vector index.
    pub fn from_index(index: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(index))
    }

    /// The 1-based number shown to users.
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// The 0-based vector index.
    pub fn index(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for StoragePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A number typed by the user, referring to the last list/search output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRef(NonZeroUsize);

impl DisplayRef {
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl FromStr for DisplayRef {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        s.parse::<usize>()
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or_else(|| VaultError::InvalidIndex(s.to_string()))
    }
}

/// The rows printed by the most recent `list` or `search`.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<(StoragePosition, Entry)>,
}

impl ResultSet {
    /// Every entry, in storage order.
    pub fn list(vault: &Vault) -> Self {
        Self {
            rows: vault.iter().map(|(p, e)| (p, e.clone())).collect(),
        }
    }

    /// Entries whose title contains `term` (case-insensitive), in
    /// storage order, each tagged with its storage position.
    pub fn search(vault: &Vault, term: &str) -> Self {
        Self {
            rows: vault
                .iter()
                .filter(|(_, e)| e.title_matches(term))
                .map(|(p, e)| (p, e.clone()))
                .collect(),
        }
    }

    pub fn rows(&self) -> &[(StoragePosition, Entry)] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a user reference to a storage position.
    ///
    /// The reference is first looked up among the positions this result
    /// set printed; failing that it is taken as a direct position.  Either
    /// way it must exist in a vault of `vault_len` entries.
    pub fn resolve(&self, reference: DisplayRef, vault_len: usize) -> Result<StoragePosition> {
        let n = reference.get();
        let position = self
            .rows
            .iter()
            .map(|(position, _)| *position)
            .find(|position| position.get() == n)
            .unwrap_or(StoragePosition(reference.0));

        if position.get() > vault_len {
            return Err(VaultError::IndexOutOfRange {
                index: n,
                count: vault_len,
            });
        }
        Ok(position)
    }
}

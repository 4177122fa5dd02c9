//! The decrypted vault document: an ordered list of entries.
//!
//! Order is the addressing scheme users rely on between sessions, so
//! nothing here ever sorts or reorders entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entry::Entry;
use super::index::StoragePosition;

/// Where a written entry lands in the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// After the last entry.
    Append,
    /// Before the first entry.
    Prepend,
    /// Overwrite this position; appends if it no longer exists.
    Replace(StoragePosition),
}

/// The full decrypted vault, `{ "logins": [Entry, ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    pub logins: Vec<Entry>,

    /// Other top-level keys, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Vault {
    pub fn new(logins: Vec<Entry>) -> Self {
        Self {
            logins,
            extra: Map::new(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }

    /// Entries in storage order, paired with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (StoragePosition, &Entry)> {
        self.logins
            .iter()
            .enumerate()
            .map(|(i, e)| (StoragePosition::from_index(i), e))
    }

    pub fn get(&self, position: StoragePosition) -> Option<&Entry> {
        self.logins.get(position.index())
    }

    pub fn get_mut(&mut self, position: StoragePosition) -> Option<&mut Entry> {
        self.logins.get_mut(position.index())
    }

    /// Insert or overwrite `entry` and return the position it now has.
    pub fn place(&mut self, entry: Entry, placement: Placement) -> StoragePosition {
        match placement {
            Placement::Replace(position) if position.index() < self.logins.len() => {
                self.logins[position.index()] = entry;
                position
            }
            Placement::Prepend => {
                self.logins.insert(0, entry);
                StoragePosition::FIRST
            }
            Placement::Append | Placement::Replace(_) => {
                self.logins.push(entry);
                StoragePosition::from_index(self.logins.len() - 1)
            }
        }
    }

    /// Remove and return the entry at `position`, if it exists.
    pub fn remove(&mut self, position: StoragePosition) -> Option<Entry> {
        if position.index() < self.logins.len() {
            Some(self.logins.remove(position.index()))
        } else {
            None
        }
    }
}

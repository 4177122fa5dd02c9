//! The mutation and save engine behind every interactive command.

use chrono::Utc;

use crate::audit;
use crate::errors::{Result, VaultError};
use crate::vault::{DisplayRef, Entry, Placement, ResultSet, StoragePosition, Vault, VaultStore};

use super::{EntryEditor, Prompter};

/// Entry counts on either side of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub before: usize,
    pub after: usize,
}

impl SaveReport {
    /// Number of entries the save added (zero if it removed some).
    pub fn added(&self) -> usize {
        self.after.saturating_sub(self.before)
    }

    /// Number of entries the save removed (zero if it added some).
    pub fn removed(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Result of `add` or `edit`.
#[derive(Debug)]
pub struct Written {
    /// Where the entry now lives.
    pub position: StoragePosition,
    /// `false` when the editor returned the seed unchanged.
    pub changed: bool,
    pub report: SaveReport,
}

/// Result of `remove`.
#[derive(Debug)]
pub struct Removed {
    pub position: StoragePosition,
    pub entry: Entry,
    pub report: SaveReport,
}

/// Result of `show`.  The entry is as it was before this access was
/// recorded.  A failed access-history save does not hide the entry.
#[derive(Debug)]
pub struct Shown {
    pub position: StoragePosition,
    pub entry: Entry,
    pub save_error: Option<VaultError>,
}

/// An unlocked vault plus everything needed to act on it.
pub struct Session<P, E> {
    store: VaultStore,
    device: String,
    results: ResultSet,
    prompter: P,
    editor: E,
}

impl<P: Prompter, E: EntryEditor> Session<P, E> {
    pub fn new(store: VaultStore, device: impl Into<String>, prompter: P, editor: E) -> Self {
        Self {
            store,
            device: device.into(),
            results: ResultSet::default(),
            prompter,
            editor,
        }
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    // ------------------------------------------------------------------
    // Read-only commands
    // ------------------------------------------------------------------

    /// Every entry, in storage order.  Replaces the current result set.
    pub fn list(&mut self) -> Result<&ResultSet> {
        let vault = self.store.load()?;
        self.results = ResultSet::list(&vault);
        Ok(&self.results)
    }

    /// Entries whose title contains `term`.  Replaces the current result set.
    pub fn search(&mut self, term: &str) -> Result<&ResultSet> {
        let vault = self.store.load()?;
        self.results = ResultSet::search(&vault, term);
        Ok(&self.results)
    }

    /// The full decrypted vault, for `print`.
    pub fn vault(&mut self) -> Result<Vault> {
        self.store.load()
    }

    // ------------------------------------------------------------------
    // Mutating commands
    // ------------------------------------------------------------------

    /// Return the referenced entry and record this access.
    pub fn show(&mut self, reference: DisplayRef) -> Result<Shown> {
        let mut vault = self.store.load()?;
        let loaded = vault.len();
        let position = self.results.resolve(reference, loaded)?;

        let target = vault
            .get_mut(position)
            .ok_or_else(|| missing(position, loaded))?;
        let entry = target.clone();
        target.record_access(&self.device, Utc::now());

        let save_error = self.save(&vault, loaded, None).err();
        if let Some(e) = &save_error {
            tracing::warn!(error = %e, "could not record access");
        }
        self.audit("show", &entry, None);

        Ok(Shown {
            position,
            entry,
            save_error,
        })
    }

    /// Create a new entry from the empty template.
    ///
    /// `placement` is normally `Append`; `Prepend` puts it first.
    pub fn add(&mut self, placement: Placement) -> Result<Written> {
        let vault = self.store.load()?;
        self.commit("add", vault, &Entry::default(), placement)
    }

    /// Edit the referenced entry in place.
    pub fn edit(&mut self, reference: DisplayRef) -> Result<Written> {
        let vault = self.store.load()?;
        let position = self.results.resolve(reference, vault.len())?;
        let seed = vault
            .get(position)
            .cloned()
            .ok_or_else(|| missing(position, vault.len()))?;
        self.commit("edit", vault, &seed, Placement::Replace(position))
    }

    /// Delete the referenced entry after confirmation.
    pub fn remove(&mut self, reference: DisplayRef) -> Result<Removed> {
        let mut vault = self.store.load()?;
        let loaded = vault.len();
        let position = self.results.resolve(reference, loaded)?;

        let entry = vault
            .remove(position)
            .ok_or_else(|| missing(position, loaded))?;
        let prompt = format!(
            "Proceed with deleting entry {position} \"{}\"?",
            entry.display_title()
        );

        let report = self.save(&vault, loaded, Some(&prompt))?;
        self.audit("remove", &entry, Some(&format!("entry {position}")));

        Ok(Removed {
            position,
            entry,
            report,
        })
    }

    /// Persist `vault`, which was loaded holding `loaded` entries.
    ///
    /// Fewer entries than were loaded needs a yes from the prompter
    /// (`prompt`, or a generic warning); anything else returns
    /// `UserCancelled` and nothing is written.  Write failures come back
    /// as `SaveFailed`.
    pub fn save(&mut self, vault: &Vault, loaded: usize, prompt: Option<&str>) -> Result<SaveReport> {
        let report = SaveReport {
            before: loaded,
            after: vault.len(),
        };

        if report.removed() > 0 {
            let default_prompt;
            let question = match prompt {
                Some(p) => p,
                None => {
                    default_prompt = format!(
                        "Warning: {} entries would be removed. Proceed?",
                        report.removed()
                    );
                    &default_prompt
                }
            };
            if !self.prompter.confirm(question)? {
                return Err(VaultError::UserCancelled);
            }
        }

        self.store
            .save(vault)
            .map_err(|e| VaultError::SaveFailed(e.to_string()))?;
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Run the editor on `seed`, validate the candidate, stamp it, place
    /// it and save.
    fn commit(
        &mut self,
        operation: &str,
        mut vault: Vault,
        seed: &Entry,
        placement: Placement,
    ) -> Result<Written> {
        let loaded = vault.len();
        let mut candidate = self.editor.edit(seed)?;
        candidate.validate()?;

        let now = Utc::now();
        let changed = candidate != *seed;
        if changed {
            candidate.last_changed_utc = Some(now);
        }
        candidate.record_access(&self.device, now);

        let title = candidate.title.clone();
        let position = vault.place(candidate, placement);
        let report = self.save(&vault, loaded, None)?;

        audit::log_audit(
            self.store.path(),
            operation,
            &self.device,
            Some(&title),
            Some(&format!("entry {position}")),
        );

        Ok(Written {
            position,
            changed,
            report,
        })
    }

    fn audit(&self, operation: &str, entry: &Entry, details: Option<&str>) {
        audit::log_audit(
            self.store.path(),
            operation,
            &self.device,
            Some(&entry.title),
            details,
        );
    }
}

fn missing(position: StoragePosition, count: usize) -> VaultError {
    VaultError::IndexOutOfRange {
        index: position.get(),
        count,
    }
}

//! Interactive session: unlock handshake and the mutation/save engine.
//!
//! A `Session` owns the unlocked `VaultStore`, the device name written to
//! access history, the current `ResultSet`, and the two collaborators that
//! talk to the user: a `Prompter` for confirmations and passphrases, and
//! an `EntryEditor` that turns an entry into an edited candidate.
//!
//! Every operation loads a fresh vault from disk, applies exactly one
//! logical change, and writes the whole vault back.

pub mod engine;
pub mod unlock;

use zeroize::Zeroizing;

use crate::errors::Result;
use crate::vault::Entry;

pub use engine::{Removed, SaveReport, Session, Shown, Written};
pub use unlock::{unlock, Unlocked};

/// Asks the user things.
pub trait Prompter {
    /// Read a passphrase without echoing it.
    fn passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>>;

    /// Ask a yes/no question; only an explicit yes returns `true`.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Produces an edited copy of an entry.
pub trait EntryEditor {
    /// Let the user edit `entry` and return the candidate.  The result is
    /// not validated here.
    fn edit(&mut self, entry: &Entry) -> Result<Entry>;
}

impl<T: Prompter + ?Sized> Prompter for &mut T {
    fn passphrase(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        (**self).passphrase(prompt)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        (**self).confirm(prompt)
    }
}

impl<T: EntryEditor + ?Sized> EntryEditor for &mut T {
    fn edit(&mut self, entry: &Entry) -> Result<Entry> {
        (**self).edit(entry)
    }
}

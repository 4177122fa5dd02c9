//! Passphrase handshake: one retry, then give up.

use std::path::{Path, PathBuf};

use crate::backup;
use crate::cli::output;
use crate::errors::{Result, VaultError};
use crate::vault::VaultStore;

use super::Prompter;

/// The outcome of a successful unlock.
pub struct Unlocked {
    pub store: VaultStore,
    /// Number of entries in the vault at unlock time.
    pub entries: usize,
    /// Where the startup backup went, if one was taken.
    pub backup: Option<PathBuf>,
}

/// Prompt for the passphrase and open the vault at `path`.
///
/// A passphrase that fails to decrypt and parse the vault gets exactly
/// one retry; the second failure is returned to the caller, which is
/// expected to exit.  Any other failure (missing file, IO) is returned
/// immediately.  On success the still-encrypted file is copied into
/// `backup_dir`, if given; a failed backup is only a warning.
pub fn unlock<P: Prompter>(
    path: &Path,
    backup_dir: Option<&Path>,
    prompter: &mut P,
) -> Result<Unlocked> {
    if !path.exists() {
        return Err(VaultError::VaultNotFound(path.to_path_buf()));
    }

    let passphrase = prompter.passphrase("Master password")?;
    let (store, vault) = match VaultStore::unlock(path, passphrase) {
        Ok(opened) => opened,
        Err(e) if e.is_corrupt_data() => {
            output::error(&format!("Failed to open vault: {e}"));
            let retry = prompter.passphrase("Master password (retry)")?;
            VaultStore::unlock(path, retry)?
        }
        Err(e) => return Err(e),
    };

    let backup = backup_dir.and_then(|dir| match backup::create_backup(path, dir) {
        Ok(copy) => Some(copy),
        Err(e) => {
            tracing::warn!(error = %e, "startup backup failed");
            output::warning(&format!("{e} — continuing without a backup"));
            None
        }
    });

    Ok(Unlocked {
        store,
        entries: vault.len(),
        backup,
    })
}

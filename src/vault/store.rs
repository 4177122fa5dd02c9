//! `VaultStore`: the vault file plus the session key that opens it.
//!
//! There is no long-lived in-memory vault.  Every `load` reads and
//! decrypts the file again, so each command acts on the latest on-disk
//! state, and every `save` re-seals the whole document.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::kdf::Argon2Params;
use crate::crypto::keys::MasterKey;
use crate::errors::{Result, VaultError};

use super::codec::{decode_vault, encode_vault};
use super::format::{self, VaultHeader};
use super::model::Vault;

/// Handle on one vault file, holding the validated passphrase and the
/// key derived from it for the lifetime of the session.
pub struct VaultStore {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// The session passphrase (wiped on drop).  Kept so the key can be
    /// re-derived if another process re-salts the file.
    passphrase: Zeroizing<String>,

    /// Header of the most recently loaded (or created) file.
    header: VaultHeader,

    /// Master key matching `header` (zeroized on drop).
    master_key: MasterKey,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Prepare a store for a new vault without touching the disk.
    ///
    /// Generates a fresh salt and derives the master key.  Nothing is
    /// written until `save` is called.
    pub fn init(
        path: &Path,
        passphrase: Zeroizing<String>,
        argon2_params: &Argon2Params,
    ) -> Result<Self> {
        let header = VaultHeader::new(*argon2_params);
        let master_key = header.derive_master_key(passphrase.as_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            passphrase,
            header,
            master_key,
        })
    }

    /// Create a brand-new, empty vault file at `path`.
    pub fn create(
        path: &Path,
        passphrase: Zeroizing<String>,
        argon2_params: &Argon2Params,
    ) -> Result<Self> {
        if path.exists() {
            return Err(VaultError::VaultAlreadyExists(path.to_path_buf()));
        }

        let store = Self::init(path, passphrase, argon2_params)?;
        store.save(&Vault::default())?;
        Ok(store)
    }

    /// Open an existing vault, proving the passphrase by decrypting and
    /// parsing it.  Returns the store together with the decoded vault.
    pub fn unlock(path: &Path, passphrase: Zeroizing<String>) -> Result<(Self, Vault)> {
        if passphrase.is_empty() {
            return Err(VaultError::ConfigError("passphrase cannot be empty".into()));
        }

        let sealed = format::parse(&format::read_file(path)?)?;
        let master_key = sealed.header.derive_master_key(passphrase.as_bytes())?;
        let vault = decode_vault(&Zeroizing::new(sealed.open_with_key(&master_key)?))?;

        let store = Self {
            path: path.to_path_buf(),
            passphrase,
            header: sealed.header,
            master_key,
        };
        Ok((store, vault))
    }

    // ------------------------------------------------------------------
    // Load / save
    // ------------------------------------------------------------------

    /// Read, decrypt and decode the current on-disk vault.
    pub fn load(&mut self) -> Result<Vault> {
        let sealed = format::parse(&format::read_file(&self.path)?)?;

        if !sealed.header.same_key_material(&self.header) {
            tracing::debug!("vault header changed on disk, re-deriving key");
            self.master_key = sealed
                .header
                .derive_master_key(self.passphrase.as_bytes())?;
        }
        self.header = sealed.header.clone();

        let plaintext = Zeroizing::new(sealed.open_with_key(&self.master_key)?);
        decode_vault(&plaintext)
    }

    /// Encode, seal and atomically write `vault` over the vault file.
    pub fn save(&self, vault: &Vault) -> Result<()> {
        let plaintext = Zeroizing::new(encode_vault(vault)?);
        let bytes = format::seal_with_key(&self.header, &self.master_key, &plaintext)?;
        format::write_atomic(&self.path, &bytes)?;
        tracing::debug!(path = %self.path.display(), entries = vault.len(), "vault saved");
        Ok(())
    }

    /// Switch to a new passphrase with a fresh salt.
    ///
    /// Only the in-memory key changes; call `save` to re-seal the file.
    pub fn rekey(&mut self, passphrase: Zeroizing<String>, argon2_params: &Argon2Params) -> Result<()> {
        let header = VaultHeader {
            created_at: self.header.created_at,
            ..VaultHeader::new(*argon2_params)
        };
        self.master_key = header.derive_master_key(passphrase.as_bytes())?;
        self.header = header;
        self.passphrase = passphrase;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the header of the last loaded file.
    pub fn header(&self) -> &VaultHeader {
        &self.header
    }
}

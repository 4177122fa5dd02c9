//! Sub-key derivation using HKDF-SHA256.
//!
//! The Argon2id output is the master key; the AES key that actually
//! seals the vault body is expanded from it with a fixed context string,
//! so the master key itself never touches the cipher.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

/// HKDF `info` string binding the derived key to its purpose.
const VAULT_KEY_INFO: &[u8] = b"pwvault-vault-key";

/// Derive the vault body encryption key from the master key.
pub fn derive_vault_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, VAULT_KEY_INFO)
}

// The master key already has high entropy (it came from Argon2id), so
// the extract step runs with an all-zero salt.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte master key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the vault body encryption key from this master key.
    pub fn derive_vault_key(&self) -> Result<[u8; KEY_LEN]> {
        derive_vault_key(&self.bytes)
    }
}

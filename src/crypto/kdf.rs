//! Passphrase-based key derivation using Argon2id.
//!
//! The master passphrase is never used as a key directly.  It is
//! stretched with Argon2id over a per-vault random salt; the parameters
//! live in the vault header so a vault always re-opens with the settings
//! it was sealed with.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// The cheapest parameters `derive_master_key` accepts.  Tests use
    /// these to keep key derivation fast.
    pub const fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Derive a 32-byte master key from a passphrase and salt.
///
/// The same passphrase + salt + params always produce the same key.
/// Rejects parameters below the minimums and empty passphrases.
pub fn derive_master_key(
    passphrase: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<[u8; KEY_LEN]> {
    if passphrase.is_empty() {
        return Err(VaultError::ConfigError("passphrase cannot be empty".into()));
    }
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(VaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase, salt, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let salt = [7u8; SALT_LEN];
        let params = Argon2Params::minimum();
        let a = derive_master_key(b"correct horse", &salt, &params).unwrap();
        let b = derive_master_key(b"correct horse", &salt, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_salt_gives_different_key() {
        let params = Argon2Params::minimum();
        let a = derive_master_key(b"pw", &[1u8; SALT_LEN], &params).unwrap();
        let b = derive_master_key(b"pw", &[2u8; SALT_LEN], &params).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_passphrase_is_config_error() {
        let result = derive_master_key(b"", &[0u8; SALT_LEN], &Argon2Params::minimum());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn weak_params_rejected() {
        let params = Argon2Params {
            memory_kib: 1024,
            ..Argon2Params::minimum()
        };
        assert!(derive_master_key(b"pw", &[0u8; SALT_LEN], &params).is_err());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}

//! `pwvault migrate`: convert a legacy keystream-encrypted vault.
//!
//! The legacy file is decrypted with its old key, checked by decoding it
//! as a vault, and written out sealed under a new master password.  The
//! entries themselves are carried over untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use zeroize::Zeroizing;

use crate::audit;
use crate::backup;
use crate::cli::output;
use crate::cli::{load_settings, prompt_new_password, prompt_password, vault_path, Cli};
use crate::crypto::legacy;
use crate::errors::{Result, VaultError};
use crate::vault::{decode_vault, Vault, VaultStore};

/// Execute the `migrate` command.
pub fn execute(cli: &Cli, legacy_file: &Path, force: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let target = vault_path(cli, &settings)?;

    // 1. Refuse to clobber an existing vault unless asked to.
    if target.exists() && !force {
        output::tip("Pass --force to replace it.");
        return Err(VaultError::VaultAlreadyExists(target));
    }

    // 2. Decrypt and validate the legacy file.
    let key = prompt_password("Legacy vault key")?;
    let vault = read_legacy(legacy_file, key.as_bytes())?;
    output::info(&format!(
        "Read {} entries from {}",
        vault.len(),
        legacy_file.display()
    ));

    // 3. Keep a copy of whatever is being replaced.
    if target.exists() && settings.backups_enabled {
        match backup::create_backup(&target, &settings.backup_dir(&target)) {
            Ok(copy) => output::info(&format!("Previous vault saved to {}", copy.display())),
            Err(e) => {
                tracing::warn!(error = %e, "backup before migrate failed");
                output::warning(&e.to_string());
            }
        }
    }

    // 4. Seal under the new password.
    output::info("Choose the master password for the migrated vault.");
    let password = prompt_new_password()?;
    let store = VaultStore::init(&target, password, &settings.argon2_params())?;
    store.save(&vault)?;

    audit::log_audit(
        &target,
        "migrate",
        &settings.device_name(),
        None,
        Some(&format!("{} entries from {}", vault.len(), legacy_file.display())),
    );

    output::success(&format!(
        "Migrated {} entries to {}",
        vault.len(),
        target.display()
    ));
    Ok(())
}

/// Decrypt a legacy vault file with `key` and decode it.
///
/// A wrong key produces bytes that do not decode, reported as corrupt data.
pub fn read_legacy(path: &Path, key: &[u8]) -> Result<Vault> {
    let data = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => VaultError::VaultNotFound(path.to_path_buf()),
        _ => VaultError::Io(e),
    })?;

    let plaintext = Zeroizing::new(legacy::transform(&data, key)?);
    decode_vault(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_legacy(dir: &Path, json: &str, key: &[u8]) -> std::path::PathBuf {
        let path = dir.join("legacy.dat");
        fs::write(&path, legacy::transform(json.as_bytes(), key).unwrap()).unwrap();
        path
    }

    #[test]
    fn reads_legacy_file_with_right_key() {
        let dir = TempDir::new().unwrap();
        let path = write_legacy(
            dir.path(),
            r#"{"logins":[{"title":"A","username":"a","last_accessed_utc":"2020-01-01T00:00:00Z"}]}"#,
            b"old-key",
        );

        let vault = read_legacy(&path, b"old-key").unwrap();
        assert_eq!(vault.len(), 1);
        assert!(vault.logins[0].access.is_legacy());
    }

    #[test]
    fn wrong_key_is_corrupt_data() {
        let dir = TempDir::new().unwrap();
        let path = write_legacy(dir.path(), r#"{"logins":[]}"#, b"old-key");

        assert!(read_legacy(&path, b"other").unwrap_err().is_corrupt_data());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_legacy(&dir.path().join("nope"), b"k"),
            Err(VaultError::VaultNotFound(_))
        ));
    }

    #[test]
    fn empty_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_legacy(dir.path(), r#"{"logins":[]}"#, b"k");
        assert!(matches!(
            read_legacy(&path, b""),
            Err(VaultError::ConfigError(_))
        ));
    }
}

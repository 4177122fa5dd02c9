//! Timestamped copies of the encrypted vault file.
//!
//! Backups are byte-for-byte copies of the sealed file, so they open with
//! whatever passphrase the vault had at the time.  Callers treat a failed
//! backup as a warning, never as a reason to stop.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::errors::{Result, VaultError};

/// Build the backup file path for `vault_path` taken at `now`:
/// `<backup_dir>/<stem>-<YYYYmmddTHHMMSS.mmmZ>.<ext>`.
pub fn backup_path(vault_path: &Path, backup_dir: &Path, now: DateTime<Utc>) -> PathBuf {
    let stem = vault_path
        .file_stem()
        .map_or_else(|| "vault".to_string(), |s| s.to_string_lossy().to_string());
    let stamp = now.format("%Y%m%dT%H%M%S%.3fZ");

    let name = match vault_path.extension() {
        Some(ext) => format!("{stem}-{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{stamp}"),
    };
    backup_dir.join(name)
}

/// Copy the vault file into `backup_dir`, creating the directory if
/// needed.  Returns the path of the new backup.
pub fn create_backup(vault_path: &Path, backup_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir).map_err(|e| {
        VaultError::BackupFailed(format!(
            "cannot create backup directory {}: {e}",
            backup_dir.display()
        ))
    })?;

    let target = backup_path(vault_path, backup_dir, Utc::now());
    if target.exists() {
        return Err(VaultError::BackupFailed(format!(
            "backup {} already exists",
            target.display()
        )));
    }

    fs::copy(vault_path, &target)
        .map_err(|e| VaultError::BackupFailed(format!("copy to {}: {e}", target.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&target, fs::Permissions::from_mode(0o600));
    }

    tracing::debug!(backup = %target.display(), "vault backed up");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn backup_name_keeps_stem_and_extension() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 6).unwrap();
        let path = backup_path(Path::new("/data/logins.pwv"), Path::new("/data/backups"), now);
        assert_eq!(
            path,
            PathBuf::from("/data/backups/logins-20240309T140506.000Z.pwv")
        );
    }

    #[test]
    fn backup_name_without_extension() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let path = backup_path(Path::new("vault"), Path::new("b"), now);
        assert_eq!(path, PathBuf::from("b/vault-20240101T000000.000Z"));
    }

    #[test]
    fn create_backup_copies_bytes_verbatim() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("v.pwv");
        fs::write(&vault, [1u8, 2, 3, 250]).unwrap();

        let backup_dir = dir.path().join("backups");
        let copy = create_backup(&vault, &backup_dir).unwrap();

        assert!(copy.starts_with(&backup_dir));
        assert_eq!(fs::read(copy).unwrap(), [1u8, 2, 3, 250]);
    }

    #[test]
    fn missing_source_is_backup_error() {
        let dir = TempDir::new().unwrap();
        let result = create_backup(&dir.path().join("absent.pwv"), dir.path());
        assert!(matches!(result, Err(VaultError::BackupFailed(_))));
    }
}

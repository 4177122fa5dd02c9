use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{Result, VaultError};

/// Device name recorded when neither the config nor the OS provides one.
const FALLBACK_DEVICE: &str = "unknown-device";

/// User configuration, loaded from `.pwvault.toml`.
///
/// Every field has a sensible default so pwvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file path (relative paths resolve against the working directory).
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Backup directory (relative paths resolve against the vault's directory).
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// Take a backup copy on every successful unlock.
    #[serde(default = "default_backups_enabled")]
    pub backups_enabled: bool,

    /// Name recorded in access history; defaults to the host name.
    #[serde(default)]
    pub device_name: Option<String>,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "vault.pwv".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

fn default_backups_enabled() -> bool {
    true
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            backup_dir: default_backup_dir(),
            backups_enabled: default_backups_enabled(),
            device_name: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".pwvault.toml";

    /// Load settings from `<project_dir>/.pwvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            VaultError::ConfigError(format!("cannot read {}: {e}", config_path.display()))
        })?;

        toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Full path to the vault file.
    pub fn vault_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_file)
    }

    /// Directory backups of `vault_path` are written to.
    pub fn backup_dir(&self, vault_path: &Path) -> PathBuf {
        let base = vault_path.parent().unwrap_or(Path::new("."));
        base.join(&self.backup_dir)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// The device name for access history: the configured override, else
    /// the host name.
    pub fn device_name(&self) -> String {
        if let Some(name) = self.device_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                return name.to_string();
            }
        }

        whoami::fallible::hostname().unwrap_or_else(|e| {
            tracing::warn!("cannot read host name: {e}");
            FALLBACK_DEVICE.to_string()
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_file, "vault.pwv");
        assert_eq!(s.backup_dir, "backups");
        assert!(s.backups_enabled);
        assert!(s.device_name.is_none());
        assert_eq!(s.argon2_params(), Argon2Params::default());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, "vault.pwv");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_file = "data/logins.pwv"
backup_dir = "/var/backups/pw"
backups_enabled = false
device_name = "work-laptop"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join(".pwvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, "data/logins.pwv");
        assert_eq!(settings.backup_dir, "/var/backups/pw");
        assert!(!settings.backups_enabled);
        assert_eq!(settings.device_name(), "work-laptop");
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pwvault.toml"), "vault_file = \"x.pwv\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, "x.pwv");
        assert_eq!(settings.backup_dir, "backups");
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pwvault.toml"), "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load(tmp.path()),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn load_from_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(Settings::load_from(&tmp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn backup_dir_is_relative_to_vault() {
        let s = Settings::default();
        assert_eq!(
            s.backup_dir(Path::new("/home/me/secrets/vault.pwv")),
            PathBuf::from("/home/me/secrets/backups")
        );

        let absolute = Settings {
            backup_dir: "/mnt/usb".into(),
            ..Settings::default()
        };
        assert_eq!(
            absolute.backup_dir(Path::new("/home/me/vault.pwv")),
            PathBuf::from("/mnt/usb")
        );
    }

    #[test]
    fn blank_device_override_falls_back_to_host() {
        let s = Settings {
            device_name: Some("  ".into()),
            ..Settings::default()
        };
        assert!(!s.device_name().is_empty());
    }
}

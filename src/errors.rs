use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in pwvault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong passphrase or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault file errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Vault contents are corrupt: {0}")]
    CorruptData(String),

    // --- Entry and index errors ---
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid index '{0}' — provide a number from the last search/list")]
    InvalidIndex(String),

    #[error("Index {index} not valid — there are only {count} entries in the vault")]
    IndexOutOfRange { index: usize, count: usize },

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vault was not saved: {0}")]
    SaveFailed(String),

    #[error("Backup failed: {0}")]
    BackupFailed(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Editor error: {0}")]
    EditorError(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

impl VaultError {
    /// Returns `true` for failures that mean "the bytes did not decrypt
    /// and parse under this key". The unlock handshake treats these as a
    /// wrong passphrase and offers one retry.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            Self::DecryptionFailed | Self::InvalidVaultFormat(_) | Self::CorruptData(_)
        )
    }
}

/// Convenience type alias for pwvault results.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_data_classification() {
        assert!(VaultError::DecryptionFailed.is_corrupt_data());
        assert!(VaultError::CorruptData("bad json".into()).is_corrupt_data());
        assert!(VaultError::InvalidVaultFormat("magic".into()).is_corrupt_data());
        assert!(!VaultError::VaultNotFound(PathBuf::from("x")).is_corrupt_data());
        assert!(!VaultError::UserCancelled.is_corrupt_data());
    }

    #[test]
    fn out_of_range_message_names_count() {
        let msg = VaultError::IndexOutOfRange { index: 9, count: 3 }.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains("only 3 entries"));
    }
}

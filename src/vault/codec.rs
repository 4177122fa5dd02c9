//! JSON (de)serialization of the decrypted vault body.

use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

use super::entry::Entry;
use super::model::Vault;

/// Serialize a vault to compact UTF-8 JSON.
pub fn encode_vault(vault: &Vault) -> Result<Vec<u8>> {
    serde_json::to_vec(vault).map_err(|e| VaultError::SerializationError(format!("vault: {e}")))
}

/// Parse decrypted bytes into a vault.
///
/// Fails with `CorruptData` if the bytes are not UTF-8, not JSON, or do
/// not carry a top-level `logins` array.  Individual entries are decoded
/// permissively and are never validated here.
pub fn decode_vault(bytes: &[u8]) -> Result<Vault> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| VaultError::CorruptData("vault is not valid UTF-8 text".into()))?;

    serde_json::from_str(text).map_err(|e| VaultError::CorruptData(format!("vault JSON: {e}")))
}

/// Pretty JSON of the whole vault, for `print`.
pub fn vault_to_pretty_json(vault: &Vault) -> Result<Zeroizing<String>> {
    serde_json::to_string_pretty(vault)
        .map(Zeroizing::new)
        .map_err(|e| VaultError::SerializationError(format!("vault: {e}")))
}

/// Pretty JSON of a single entry, as shown by `show` and the editor.
pub fn entry_to_json(entry: &Entry) -> Result<Zeroizing<String>> {
    serde_json::to_string_pretty(entry)
        .map(Zeroizing::new)
        .map_err(|e| VaultError::SerializationError(format!("entry: {e}")))
}

/// Parse a single entry.  The text must be a JSON object; its fields are
/// decoded as permissively as entries inside a vault.
pub fn entry_from_json(text: &str) -> Result<Entry> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| VaultError::InvalidEntry(format!("not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(VaultError::InvalidEntry("expected a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| VaultError::InvalidEntry(e.to_string()))
}

//! Sealed vault file format.
//!
//! A vault file has this layout:
//!
//! ```text
//! [PWVT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][nonce: 12 bytes][ciphertext + tag]
//! ```
//!
//! - **Magic** (`PWVT`): identifies the file as a pwvault vault.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the sealed body begins.
//! - **Header JSON**: serialized `VaultHeader` (salt and KDF parameters).
//! - **Body**: AES-256-GCM over the vault JSON, with the header bytes as
//!   associated data.  A wrong passphrase and a tampered header both
//!   surface as `DecryptionFailed`.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::encryption::{self, NONCE_LEN, TAG_LEN};
use crate::crypto::kdf::{derive_master_key, generate_salt, Argon2Params};
use crate::crypto::keys::MasterKey;
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"PWVT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Metadata stored in clear at the beginning of a vault file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version.
    pub version: u8,

    /// The salt used for Argon2id key derivation (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// When this vault was first created.
    pub created_at: DateTime<Utc>,

    /// Argon2 params the master key was derived with.
    pub argon2_params: Argon2Params,
}

impl VaultHeader {
    /// A header with a fresh random salt.
    pub fn new(argon2_params: Argon2Params) -> Self {
        Self {
            version: CURRENT_VERSION,
            salt: generate_salt().to_vec(),
            created_at: Utc::now(),
            argon2_params,
        }
    }

    /// Derive the master key for this header's salt and parameters.
    pub fn derive_master_key(&self, passphrase: &[u8]) -> Result<MasterKey> {
        let mut bytes = derive_master_key(passphrase, &self.salt, &self.argon2_params)?;
        let key = MasterKey::new(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// `true` if a key derived for `other` also opens this header.
    pub fn same_key_material(&self, other: &VaultHeader) -> bool {
        self.salt == other.salt && self.argon2_params == other.argon2_params
    }
}

// ---------------------------------------------------------------------------
// Sealing
// ---------------------------------------------------------------------------

/// A parsed but still encrypted vault file.
#[derive(Debug, Clone)]
pub struct SealedVault {
    pub header: VaultHeader,
    /// The raw header JSON exactly as stored; authenticated as AAD.
    pub header_bytes: Vec<u8>,
    /// Nonce followed by ciphertext and tag.
    pub body: Vec<u8>,
}

impl SealedVault {
    /// Decrypt the body with `master_key`.
    pub fn open_with_key(&self, master_key: &MasterKey) -> Result<Vec<u8>> {
        let mut vault_key = master_key.derive_vault_key()?;
        let plaintext = encryption::decrypt(&vault_key, &self.body, &self.header_bytes);
        vault_key.zeroize();
        plaintext
    }
}

/// Encrypt `plaintext` under `header` and return the complete file bytes.
pub fn seal_with_key(header: &VaultHeader, master_key: &MasterKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| VaultError::SerializationError(format!("header: {e}")))?;
    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        VaultError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;

    let mut vault_key = master_key.derive_vault_key()?;
    let body = encryption::encrypt(&vault_key, plaintext, &header_bytes);
    vault_key.zeroize();
    let body = body?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + body.len());
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header JSON
    buf.extend_from_slice(&body); // nonce || ciphertext || tag
    Ok(buf)
}

/// Split raw file bytes into header and sealed body.
pub fn parse(data: &[u8]) -> Result<SealedVault> {
    if data.len() < PREFIX_LEN + NONCE_LEN + TAG_LEN {
        return Err(VaultError::InvalidVaultFormat(
            "file too small to be a valid vault".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(VaultError::InvalidVaultFormat(
            "missing PWVT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(VaultError::InvalidVaultFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| VaultError::InvalidVaultFormat("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        VaultError::InvalidVaultFormat(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN
        .checked_add(header_len)
        .filter(|end| end + NONCE_LEN + TAG_LEN <= data.len())
        .ok_or_else(|| VaultError::InvalidVaultFormat("header length exceeds file size".into()))?;

    let header_bytes = data[PREFIX_LEN..header_end].to_vec();
    let header: VaultHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| VaultError::InvalidVaultFormat(format!("header JSON: {e}")))?;

    Ok(SealedVault {
        header,
        header_bytes,
        body: data[header_end..].to_vec(),
    })
}

/// Seal `plaintext` under a passphrase with a fresh salt.
///
/// `open(&seal(p, k, params)?, k)? == p` for every non-empty `k`.
pub fn seal(plaintext: &[u8], passphrase: &[u8], argon2_params: &Argon2Params) -> Result<Vec<u8>> {
    let header = VaultHeader::new(*argon2_params);
    let master_key = header.derive_master_key(passphrase)?;
    seal_with_key(&header, &master_key, plaintext)
}

/// Open bytes produced by `seal`.
pub fn open(data: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    if passphrase.is_empty() {
        return Err(VaultError::ConfigError("passphrase cannot be empty".into()));
    }
    let sealed = parse(data)?;
    let master_key = sealed.header.derive_master_key(passphrase)?;
    sealed.open_with_key(&master_key)
}

// ---------------------------------------------------------------------------
// File IO
// ---------------------------------------------------------------------------

/// Read a vault file, mapping a missing file to `VaultNotFound`.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(VaultError::VaultNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Write `bytes` to `path` **atomically**.
///
/// Writes a temp file in the same directory, syncs it, then renames it
/// over the target, so a crash mid-write never truncates the vault.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&tmp_path)?
    };

    #[cfg(not(unix))]
    let mut file = fs::File::create(&tmp_path)?;

    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn params() -> Argon2Params {
        Argon2Params::minimum()
    }

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal(br#"{"logins":[]}"#, b"k", &params()).unwrap();
        assert_eq!(&sealed[0..4], MAGIC);
        assert_eq!(open(&sealed, b"k").unwrap(), br#"{"logins":[]}"#);
    }

    #[test]
    fn wrong_passphrase_is_decryption_failure() {
        let sealed = seal(b"secret", b"right", &params()).unwrap();
        assert!(matches!(
            open(&sealed, b"wrong"),
            Err(VaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn empty_passphrase_rejected_both_ways() {
        assert!(matches!(
            seal(b"x", b"", &params()),
            Err(VaultError::ConfigError(_))
        ));
        let sealed = seal(b"x", b"k", &params()).unwrap();
        assert!(matches!(open(&sealed, b""), Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn tampered_header_fails_tag_check() {
        let sealed = seal(b"secret", b"pw", &params()).unwrap();
        let parsed = parse(&sealed).unwrap();

        let mut header = parsed.header.clone();
        header.created_at = header.created_at + chrono::Duration::seconds(1);
        let new_header = serde_json::to_vec(&header).unwrap();

        let mut forged = Vec::new();
        forged.extend_from_slice(MAGIC);
        forged.push(CURRENT_VERSION);
        forged.extend_from_slice(&(new_header.len() as u32).to_le_bytes());
        forged.extend_from_slice(&new_header);
        forged.extend_from_slice(&parsed.body);

        assert!(matches!(
            open(&forged, b"pw"),
            Err(VaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn rejects_bad_magic_and_short_files() {
        assert!(matches!(
            parse(b"tiny"),
            Err(VaultError::InvalidVaultFormat(_))
        ));
        let mut sealed = seal(b"x", b"pw", &params()).unwrap();
        sealed[0] = b'X';
        assert!(parse(&sealed).unwrap_err().is_corrupt_data());
    }

    #[test]
    fn rejects_oversized_header_length() {
        let mut sealed = seal(b"x", b"pw", &params()).unwrap();
        sealed[5..9].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            parse(&sealed),
            Err(VaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_file(&dir.path().join("nope.pwv")),
            Err(VaultError::VaultNotFound(_))
        ));
    }

    #[test]
    fn atomic_write_replaces_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.pwv");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");
        assert!(!dir.path().join(".v.pwv.tmp").exists());
    }
}

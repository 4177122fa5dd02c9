//! Cryptographic primitives for pwvault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - HKDF sub-key derivation and the zeroizing `MasterKey` (`keys`)
//! - The legacy repeating-key transform, for migration only (`legacy`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod legacy;

pub use encryption::{decrypt, encrypt};
pub use kdf::{derive_master_key, generate_salt, Argon2Params};
pub use keys::{derive_vault_key, MasterKey};

//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - `Entry` and its access history (`entry`)
//! - The ordered `Vault` document and `Placement` (`model`)
//! - JSON encoding of the decrypted body (`codec`)
//! - Display references versus storage positions (`index`)
//! - The sealed binary file format (`format`)
//! - `VaultStore`, the load/save handle used by sessions (`store`)

pub mod codec;
pub mod entry;
pub mod format;
pub mod index;
pub mod model;
pub mod store;

pub use codec::{decode_vault, encode_vault, entry_from_json, entry_to_json, vault_to_pretty_json};
pub use entry::{AccessHistory, AccessRecord, Entry};
pub use format::VaultHeader;
pub use index::{DisplayRef, ResultSet, StoragePosition};
pub use model::{Placement, Vault};
pub use store::VaultStore;

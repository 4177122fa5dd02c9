//! Integration tests for the pwvault cipher layer and legacy transform.

use pwvault::crypto::kdf::Argon2Params;
use pwvault::crypto::keys::MasterKey;
use pwvault::crypto::{decrypt, derive_master_key, encrypt, generate_salt, legacy};
use pwvault::vault::{decode_vault, format};

// ---------------------------------------------------------------------------
// AEAD primitives
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = br#"{"logins":[]}"#;

    let ciphertext = encrypt(&key, plaintext, b"header").expect("encrypt should succeed");
    assert!(ciphertext.len() > plaintext.len());

    let recovered = decrypt(&key, &ciphertext, b"header").expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn tampered_associated_data_fails() {
    let key = [0x11u8; 32];
    let ciphertext = encrypt(&key, b"secret", b"v1").unwrap();
    assert!(decrypt(&key, &ciphertext, b"v2").is_err());
}

#[test]
fn same_passphrase_and_salt_give_same_key() {
    let salt = generate_salt();
    let params = Argon2Params::minimum();
    let a = derive_master_key(b"hunter22", &salt, &params).unwrap();
    let b = derive_master_key(b"hunter22", &salt, &params).unwrap();
    assert_eq!(a, b);

    let key = MasterKey::new(a);
    assert_ne!(key.derive_vault_key().unwrap(), a);
}

// ---------------------------------------------------------------------------
// Sealed file format
// ---------------------------------------------------------------------------

#[test]
fn sealed_file_rejects_wrong_passphrase() {
    let sealed = format::seal(br#"{"logins":[]}"#, b"right", &Argon2Params::minimum()).unwrap();

    let err = format::open(&sealed, b"wrong").unwrap_err();
    assert!(err.is_corrupt_data());
}

#[test]
fn sealed_file_rejects_flipped_header_byte() {
    let mut sealed = format::seal(b"{}", b"k", &Argon2Params::minimum()).unwrap();
    // Inside the JSON header, after magic + version + length.
    sealed[12] ^= 0x01;
    assert!(format::open(&sealed, b"k").is_err());
}

#[test]
fn empty_passphrase_is_a_config_error() {
    let sealed = format::seal(b"{}", b"k", &Argon2Params::minimum()).unwrap();
    assert!(!format::open(&sealed, b"").unwrap_err().is_corrupt_data());
}

// ---------------------------------------------------------------------------
// Legacy transform
// ---------------------------------------------------------------------------

#[test]
fn legacy_wrong_key_fails_the_codec() {
    let doc = br#"{"logins":[{"title":"A","username":"a"}]}"#;
    let encrypted = legacy::transform(doc, b"old").unwrap();

    let garbled = legacy::transform(&encrypted, b"new").unwrap();
    assert!(decode_vault(&garbled).unwrap_err().is_corrupt_data());

    let clear = legacy::transform(&encrypted, b"old").unwrap();
    assert_eq!(decode_vault(&clear).unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn aead_roundtrip(
            key in prop::array::uniform32(any::<u8>()),
            plaintext in prop::collection::vec(any::<u8>(), 0..512),
            aad in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let sealed = encrypt(&key, &plaintext, &aad).unwrap();
            prop_assert_eq!(decrypt(&key, &sealed, &aad).unwrap(), plaintext);
        }

        #[test]
        fn aead_wrong_key_fails(
            key in prop::array::uniform32(any::<u8>()),
            other in prop::array::uniform32(any::<u8>()),
            plaintext in prop::collection::vec(any::<u8>(), 0..128),
        ) {
            prop_assume!(key != other);
            let sealed = encrypt(&key, &plaintext, b"").unwrap();
            prop_assert!(decrypt(&other, &sealed, b"").is_err());
        }

        #[test]
        fn legacy_transform_is_an_involution(
            data in prop::collection::vec(any::<u8>(), 0..512),
            key in prop::collection::vec(any::<u8>(), 1..32),
        ) {
            let once = legacy::transform(&data, &key).unwrap();
            prop_assert_eq!(legacy::transform(&once, &key).unwrap(), data);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn sealed_file_roundtrip(
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
            passphrase in "[a-zA-Z0-9]{1,16}",
        ) {
            let sealed = format::seal(&plaintext, passphrase.as_bytes(), &Argon2Params::minimum()).unwrap();
            prop_assert_eq!(format::open(&sealed, passphrase.as_bytes()).unwrap(), plaintext);
        }
    }
}

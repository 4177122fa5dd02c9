//! The repeating-key XOR transform used by pre-AEAD vault files.
//!
//! Each byte is combined with `key[i % key.len()]`.  The transform is its
//! own inverse, so one function serves both directions.  There is no
//! nonce and no authentication: a wrong key just yields noise, which the
//! vault codec then refuses to parse.
//!
//! Only `pwvault migrate` uses this, to read old files once and re-seal
//! them in the current format.

use crate::errors::{Result, VaultError};

/// Apply the keystream to `data`.  Fails on an empty key.
pub fn transform(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() {
        return Err(VaultError::ConfigError(
            "legacy key cannot be empty".into(),
        ));
    }

    Ok(data
        .iter()
        .zip(key.iter().cycle())
        .map(|(byte, k)| byte ^ k)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applying_twice_restores_input() {
        let data = br#"{"logins":[]}"#;
        let once = transform(data, b"k3y").unwrap();
        assert_ne!(once.as_slice(), data.as_slice());
        assert_eq!(transform(&once, b"k3y").unwrap(), data);
    }

    #[test]
    fn key_repeats_cyclically() {
        let out = transform(&[0, 0, 0, 0, 0], &[1, 2]).unwrap();
        assert_eq!(out, vec![1, 2, 1, 2, 1]);
    }

    #[test]
    fn empty_data_is_fine() {
        assert!(transform(b"", b"k").unwrap().is_empty());
    }

    #[test]
    fn empty_key_is_config_error() {
        assert!(matches!(
            transform(b"abc", b""),
            Err(VaultError::ConfigError(_))
        ));
    }
}

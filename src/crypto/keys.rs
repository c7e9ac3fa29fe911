//! Zeroize-on-drop wrappers for key material.
//!
//! `KeyMaterial` is what a verified master password yields and what a
//! `VaultSession` holds while connected. `RecordKey` is the short-lived
//! per-secret key derived from it. Neither type is `Clone`, `Debug`
//! prints no bytes, and both wipe their memory when dropped.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::kdf::{derive_key, KEY_LEN};
use crate::errors::Result;

/// Symmetric key material derived from the master password.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_LEN],
    #[zeroize(skip)]
    record_iterations: u32,
}

impl KeyMaterial {
    /// Wrap raw key bytes. `record_iterations` is the PBKDF2 iteration
    /// count used when deriving per-record keys from this material.
    pub fn new(bytes: [u8; KEY_LEN], record_iterations: u32) -> Self {
        Self {
            bytes,
            record_iterations,
        }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub fn record_iterations(&self) -> u32 {
        self.record_iterations
    }

    /// Derive the protection key for one record from this material and
    /// the record's private salt.
    pub fn derive_record_key(&self, private_salt: &[u8]) -> Result<RecordKey> {
        let bytes = derive_key(&self.bytes, private_salt, self.record_iterations)?;
        Ok(RecordKey { bytes })
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bytes", &"<redacted>")
            .field("record_iterations", &self.record_iterations)
            .finish()
    }
}

/// A per-record AES-256 key. Lives only for the duration of one
/// encrypt or decrypt call.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RecordKey {
    bytes: [u8; KEY_LEN],
}

impl RecordKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_depends_on_salt() {
        let km = KeyMaterial::new([0x11; KEY_LEN], 1_000);
        let a = km.derive_record_key(b"salt-one-1234567").unwrap();
        let b = km.derive_record_key(b"salt-two-1234567").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn record_key_matches_free_function() {
        let km = KeyMaterial::new([0x22; KEY_LEN], 1_000);
        let via_wrapper = km.derive_record_key(b"salt").unwrap();
        let via_fn = derive_key(&[0x22; KEY_LEN], b"salt", 1_000).unwrap();
        assert_eq!(via_wrapper.as_bytes(), &via_fn);
    }

    #[test]
    fn debug_output_hides_bytes() {
        let km = KeyMaterial::new([0xAB; KEY_LEN], 1_000);
        let shown = format!("{km:?}");
        assert!(shown.contains("redacted"));
        assert!(!shown.contains("171"));
    }
}

//! One encrypted, labeled record.
//!
//! Every write draws a fresh private salt and nonce, so the stored bytes
//! change even when the plaintext and key material do not. The record
//! key is derived from the session's key material and the private salt;
//! the label is bound as associated data, so a ciphertext copied under
//! another label fails authentication.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::password::{decode_field, decode_fixed};
use crate::crypto::kdf::SALT_LEN;
use crate::crypto::{decrypt, encode, encrypt, generate_nonce, generate_salt, KeyMaterial};
use crate::crypto::{NONCE_LEN, TAG_LEN};
use crate::errors::{Result, SecretStoreError};

/// Structural (persisted) form of a [`Secret`]. Binary fields are
/// URL-safe base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub label: String,
    pub private_salt: String,
    pub nonce: String,
    pub ciphertext: String,
    pub auth_tag: String,
}

impl SecretRecord {
    /// Parse a record from JSON. Missing or mistyped fields are a
    /// `MalformedRecord` error.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| SecretStoreError::MalformedRecord(format!("secret: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SecretStoreError::Serialization(format!("secret: {e}")))
    }
}

/// A single encrypted secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    label: String,
    private_salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
    auth_tag: [u8; TAG_LEN],
}

impl Secret {
    /// Encrypt `plaintext` under a key derived from `key` and a fresh
    /// private salt, bound to `label`.
    pub fn create(label: &str, plaintext: &str, key: &KeyMaterial) -> Result<Self> {
        let mut secret = Self {
            label: label.to_string(),
            private_salt: [0u8; SALT_LEN],
            nonce: [0u8; NONCE_LEN],
            ciphertext: Vec::new(),
            auth_tag: [0u8; TAG_LEN],
        };
        secret.replace(plaintext, key)?;
        Ok(secret)
    }

    /// Decrypt the content. Fails with `Authentication` if the key material
    /// is wrong or any stored field, including the label, was altered.
    pub fn decrypt(&self, key: &KeyMaterial) -> Result<String> {
        let record_key = key.derive_record_key(&self.private_salt)?;
        let plaintext = decrypt(
            &self.ciphertext,
            &self.auth_tag,
            record_key.as_bytes(),
            &self.nonce,
            self.label.as_bytes(),
        )?;

        // Convert via from_utf8 which takes ownership (no clone).
        // On error, zeroize the bytes inside the error before discarding.
        String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            SecretStoreError::MalformedRecord(format!(
                "secret '{}' is not valid UTF-8",
                self.label
            ))
        })
    }

    /// Overwrite the content in place, keeping the label. Salt, nonce,
    /// ciphertext and tag are all regenerated. On error `self` is left
    /// untouched.
    pub fn replace(&mut self, plaintext: &str, key: &KeyMaterial) -> Result<()> {
        let private_salt = generate_salt();
        let nonce = generate_nonce();

        let record_key = key.derive_record_key(&private_salt)?;
        let sealed = encrypt(
            plaintext.as_bytes(),
            record_key.as_bytes(),
            &nonce,
            self.label.as_bytes(),
        )?;
        drop(record_key);

        self.private_salt = private_salt;
        self.nonce = nonce;
        self.ciphertext = sealed.ciphertext;
        self.auth_tag = sealed.auth_tag;
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn to_record(&self) -> SecretRecord {
        SecretRecord {
            label: self.label.clone(),
            private_salt: encode(&self.private_salt),
            nonce: encode(&self.nonce),
            ciphertext: encode(&self.ciphertext),
            auth_tag: encode(&self.auth_tag),
        }
    }

    /// Rebuild a secret from its stored form, validating every field.
    pub fn from_record(record: &SecretRecord) -> Result<Self> {
        if record.label.is_empty() {
            return Err(SecretStoreError::MalformedRecord(
                "secret label is empty".into(),
            ));
        }

        Ok(Self {
            label: record.label.clone(),
            private_salt: decode_fixed("private_salt", &record.private_salt)?,
            nonce: decode_fixed("nonce", &record.nonce)?,
            ciphertext: decode_field("ciphertext", &record.ciphertext)?,
            auth_tag: decode_fixed("auth_tag", &record.auth_tag)?,
        })
    }
}

//! AES-256-GCM authenticated encryption with a detached tag.
//!
//! Unlike a "nonce || ciphertext || tag" blob, the nonce and the tag are
//! handed back separately so each can be stored as its own field.
//! Associated data is authenticated but not encrypted; callers bind a
//! record's label through it.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::Zeroize;

use crate::errors::{Result, SecretStoreError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Ciphertext and its authentication tag, as produced by [`encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub auth_tag: [u8; TAG_LEN],
}

/// Encrypt `plaintext` under a 32-byte `key` and `nonce`, authenticating
/// `associated_data` alongside it.
///
/// The nonce must never be reused with the same key.
pub fn encrypt(
    plaintext: &[u8],
    key: &[u8],
    nonce: &[u8; NONCE_LEN],
    associated_data: &[u8],
) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| SecretStoreError::Encryption(format!("invalid key length: {e}")))?;

    let mut buffer = plaintext.to_vec();
    let tag = match cipher.encrypt_in_place_detached(
        Nonce::from_slice(nonce),
        associated_data,
        &mut buffer,
    ) {
        Ok(tag) => tag,
        Err(e) => {
            buffer.zeroize();
            return Err(SecretStoreError::Encryption(format!(
                "encryption error: {e}"
            )));
        }
    };

    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(tag.as_slice());

    Ok(Sealed {
        ciphertext: buffer,
        auth_tag,
    })
}

/// Decrypt and verify data produced by [`encrypt`].
///
/// Any mismatch (wrong key, wrong nonce, altered ciphertext, altered tag,
/// different associated data) yields `Authentication`. No bytes of the
/// candidate plaintext escape on failure.
pub fn decrypt(
    ciphertext: &[u8],
    auth_tag: &[u8],
    key: &[u8],
    nonce: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN || auth_tag.len() != TAG_LEN {
        return Err(SecretStoreError::Authentication);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| SecretStoreError::Authentication)?;

    let mut buffer = ciphertext.to_vec();
    let verified = cipher.decrypt_in_place_detached(
        Nonce::from_slice(nonce),
        associated_data,
        &mut buffer,
        Tag::from_slice(auth_tag),
    );

    if verified.is_err() {
        buffer.zeroize();
        return Err(SecretStoreError::Authentication);
    }

    Ok(buffer)
}

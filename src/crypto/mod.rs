//! Cryptographic primitives for SecretStore.
//!
//! This module provides:
//! - URL-safe base64 encoding for stored fields (`encoding`)
//! - AES-256-GCM encryption with detached tags and associated data (`encryption`)
//! - Argon2id hardening, PBKDF2 key derivation, salts and nonces (`kdf`)
//! - Zeroize-on-drop key wrappers (`keys`)

pub mod encoding;
pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encoding::{decode, encode};
pub use encryption::{decrypt, encrypt, Sealed, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, generate_nonce, generate_salt, harden_password, KdfParams, SALT_LEN};
pub use keys::{KeyMaterial, RecordKey};

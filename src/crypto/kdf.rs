//! Password hardening, key derivation, and random salts/nonces.
//!
//! Two functions turn a password into key material:
//!
//! - **Argon2id** (`harden_password`) is the slow, memory-hard step. It is
//!   salted with the vault's `verification_salt` and is what makes a
//!   brute-force guess expensive.
//! - **PBKDF2-HMAC-SHA256** (`derive_key`) is the fast, iterated step. It
//!   turns the hardened password into key material (salted with the
//!   `derivation_salt`) and key material into per-record keys (salted with
//!   each record's private salt).
//!
//! Parameters are configurable via `KdfParams` (loaded from
//! `~/.secretstore.toml` or sensible defaults) and are stored alongside
//! the master password so a vault always re-opens with the same settings.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::encryption::NONCE_LEN;
use crate::errors::{Result, SecretStoreError};

/// Length of every random salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of derived keys in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum safe Argon2 memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Maximum Argon2 memory cost in KiB (4 GiB).
const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;

/// Maximum Argon2 passes.
const MAX_ARGON2_ITERATIONS: u32 = 64;

/// Maximum Argon2 lanes.
const MAX_PARALLELISM: u32 = 64;

/// Minimum PBKDF2 iteration count.
const MIN_PBKDF2_ITERATIONS: u32 = 1_000;

/// Maximum PBKDF2 iteration count.
const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

/// Key-derivation parameters for one master password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Argon2id memory cost in KiB (default: 65 536 = 64 MB).
    pub argon2_memory_kib: u32,
    /// Argon2id iterations (default: 3).
    pub argon2_iterations: u32,
    /// Argon2id parallelism lanes (default: 4).
    pub argon2_parallelism: u32,
    /// PBKDF2 iterations for key material and record keys (default: 100 000).
    pub pbkdf2_iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            argon2_memory_kib: 65_536,
            argon2_iterations: 3,
            argon2_parallelism: 4,
            pbkdf2_iterations: 100_000,
        }
    }
}

impl KdfParams {
    /// Reject dangerously weak settings, and settings too expensive to run.
    ///
    /// Parameters are read back from stored records, so the upper bounds
    /// keep a corrupted record from stalling or exhausting memory.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&self.argon2_memory_kib) {
            return Err(SecretStoreError::KeyDerivation(format!(
                "Argon2 memory_kib must be between {MIN_MEMORY_KIB} and {MAX_MEMORY_KIB} (got {})",
                self.argon2_memory_kib
            )));
        }
        if !(1..=MAX_ARGON2_ITERATIONS).contains(&self.argon2_iterations) {
            return Err(SecretStoreError::KeyDerivation(format!(
                "Argon2 iterations must be between 1 and {MAX_ARGON2_ITERATIONS} (got {})",
                self.argon2_iterations
            )));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.argon2_parallelism) {
            return Err(SecretStoreError::KeyDerivation(format!(
                "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
                self.argon2_parallelism
            )));
        }
        // Argon2 needs at least 8 KiB per lane.
        if self.argon2_memory_kib / 8 < self.argon2_parallelism {
            return Err(SecretStoreError::KeyDerivation(format!(
                "Argon2 memory_kib must be at least 8 x parallelism (got {} for {} lanes)",
                self.argon2_memory_kib, self.argon2_parallelism
            )));
        }
        check_pbkdf2_iterations(self.pbkdf2_iterations)
    }
}

fn check_pbkdf2_iterations(iterations: u32) -> Result<()> {
    if !(MIN_PBKDF2_ITERATIONS..=MAX_PBKDF2_ITERATIONS).contains(&iterations) {
        return Err(SecretStoreError::KeyDerivation(format!(
            "PBKDF2 iterations must be between {MIN_PBKDF2_ITERATIONS} and {MAX_PBKDF2_ITERATIONS} (got {iterations})"
        )));
    }
    Ok(())
}

/// Run the password through Argon2id with the given salt.
///
/// The same password + salt + params always produce the same output.
pub fn harden_password(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<[u8; KEY_LEN]> {
    params.validate()?;

    let argon2_params = Params::new(
        params.argon2_memory_kib,
        params.argon2_iterations,
        params.argon2_parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| SecretStoreError::KeyDerivation(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut out = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| SecretStoreError::KeyDerivation(format!("Argon2id hashing failed: {e}")))?;

    Ok(out)
}

/// Derive 32 bytes of key material with PBKDF2-HMAC-SHA256.
///
/// Deterministic: same password, salt and iteration count, same key.
pub fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> Result<[u8; KEY_LEN]> {
    check_pbkdf2_iterations(iterations)?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Generate a cryptographically random 12-byte AES-GCM nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

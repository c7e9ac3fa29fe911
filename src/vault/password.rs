//! The vault's single master password credential.
//!
//! Nothing derived from the password text is stored in a form that could
//! be compared against a guess. Instead, a fixed canary value is sealed
//! under the key material at creation time; a candidate password is
//! accepted exactly when the key material it produces can open that
//! canary. The same derivation that checks the password also yields the
//! key material for the session, so verification and activation are one
//! step.
//!
//! Derivation chain:
//!
//! ```text
//! hardened     = Argon2id(password, verification_salt)
//! key_material = PBKDF2-HMAC-SHA256(hardened, derivation_salt, pbkdf2_iterations)
//! canary       = AES-256-GCM(key_material, nonce, CANARY_PLAINTEXT, aad = CANARY_AAD)
//! ```

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::kdf::{derive_key, harden_password, KdfParams, SALT_LEN};
use crate::crypto::{decode, decrypt, encode, encrypt, generate_nonce, generate_salt, KeyMaterial};
use crate::crypto::{NONCE_LEN, TAG_LEN};
use crate::errors::{Result, SecretStoreError};

/// Version of the on-disk key scheme. Records carrying any other value
/// are rejected rather than guessed at.
pub const SCHEME_VERSION: u8 = 1;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The fixed value sealed as the canary.
const CANARY_PLAINTEXT: &[u8] = b"secretstore canary v1";

/// Associated data for the canary. Starts with NUL, which labels may not
/// contain.
const CANARY_AAD: &[u8] = b"\0secretstore:master-password";

/// Separator between the three parts of an encoded canary.
const CANARY_SEPARATOR: char = '~';

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn check_strength(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SecretStoreError::Weakness {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Structural (persisted) form of a [`MasterPassword`].
///
/// Binary fields are URL-safe base64. The canary is encoded as
/// `nonce~ciphertext~tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRecord {
    pub scheme: u8,
    pub verification_salt: String,
    pub derivation_salt: String,
    pub canary: String,
    pub kdf: KdfParams,
}

impl PasswordRecord {
    /// Parse a record from JSON. Missing or mistyped fields are a
    /// `MalformedRecord` error.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| SecretStoreError::MalformedRecord(format!("master password: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SecretStoreError::Serialization(format!("master password: {e}")))
    }
}

/// The sealed canary: a known plaintext encrypted under the key material.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Canary {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
    auth_tag: [u8; TAG_LEN],
}

impl Canary {
    fn seal(key: &KeyMaterial) -> Result<Self> {
        let nonce = generate_nonce();
        let sealed = encrypt(CANARY_PLAINTEXT, key.as_bytes(), &nonce, CANARY_AAD)?;
        Ok(Self {
            nonce,
            ciphertext: sealed.ciphertext,
            auth_tag: sealed.auth_tag,
        })
    }

    /// Succeeds only if `key` is the key material the canary was sealed with.
    fn open(&self, key: &KeyMaterial) -> Result<()> {
        let plaintext = Zeroizing::new(decrypt(
            &self.ciphertext,
            &self.auth_tag,
            key.as_bytes(),
            &self.nonce,
            CANARY_AAD,
        )?);

        if bool::from(plaintext.as_slice().ct_eq(CANARY_PLAINTEXT)) {
            Ok(())
        } else {
            Err(SecretStoreError::Authentication)
        }
    }

    fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            encode(&self.nonce),
            encode(&self.ciphertext),
            encode(&self.auth_tag),
            sep = CANARY_SEPARATOR
        )
    }

    fn decode(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(CANARY_SEPARATOR).map(str::trim).collect();
        let [nonce, ciphertext, auth_tag] = parts.as_slice() else {
            return Err(SecretStoreError::MalformedRecord(format!(
                "canary: expected 3 '{CANARY_SEPARATOR}'-separated parts, got {}",
                parts.len()
            )));
        };

        Ok(Self {
            nonce: decode_fixed("canary nonce", nonce)?,
            ciphertext: decode_field("canary ciphertext", ciphertext)?,
            auth_tag: decode_fixed("canary auth_tag", auth_tag)?,
        })
    }
}

/// A verified-by-decryption password credential.
///
/// Immutable once created: changing the password means creating a new
/// `MasterPassword`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterPassword {
    verification_salt: [u8; SALT_LEN],
    derivation_salt: [u8; SALT_LEN],
    canary: Canary,
    kdf: KdfParams,
}

impl MasterPassword {
    /// Create a new credential from `password` with fresh salts.
    ///
    /// Fails with `Weakness` before any key derivation if the password is
    /// too short.
    pub fn create(password: &str, params: &KdfParams) -> Result<Self> {
        Self::create_activated(password, params).map(|(master, _)| master)
    }

    /// Like [`create`](Self::create), but also hands back the key material
    /// so the caller does not have to derive it a second time.
    pub fn create_activated(password: &str, params: &KdfParams) -> Result<(Self, KeyMaterial)> {
        check_strength(password)?;
        params.validate()?;

        let verification_salt = generate_salt();
        let derivation_salt = generate_salt();
        let key = derive_key_material(password, &verification_salt, &derivation_salt, params)?;
        let canary = Canary::seal(&key)?;

        let master = Self {
            verification_salt,
            derivation_salt,
            canary,
            kdf: *params,
        };
        Ok((master, key))
    }

    /// Check `password` against the canary and return the key material it
    /// unlocks.
    ///
    /// A wrong password fails with `Authentication`; there is no other
    /// rejection path.
    pub fn verify(&self, password: &str) -> Result<KeyMaterial> {
        let key = derive_key_material(
            password,
            &self.verification_salt,
            &self.derivation_salt,
            &self.kdf,
        )?;
        self.canary.open(&key)?;
        Ok(key)
    }

    /// KDF parameters fixed at creation.
    pub fn kdf_params(&self) -> &KdfParams {
        &self.kdf
    }

    pub fn to_record(&self) -> PasswordRecord {
        PasswordRecord {
            scheme: SCHEME_VERSION,
            verification_salt: encode(&self.verification_salt),
            derivation_salt: encode(&self.derivation_salt),
            canary: self.canary.encode(),
            kdf: self.kdf,
        }
    }

    /// Rebuild a credential from its stored form, validating every field.
    pub fn from_record(record: &PasswordRecord) -> Result<Self> {
        if record.scheme != SCHEME_VERSION {
            return Err(SecretStoreError::MalformedRecord(format!(
                "unsupported key scheme {}, expected {SCHEME_VERSION}",
                record.scheme
            )));
        }
        record
            .kdf
            .validate()
            .map_err(|e| SecretStoreError::MalformedRecord(format!("kdf: {e}")))?;

        Ok(Self {
            verification_salt: decode_fixed("verification_salt", &record.verification_salt)?,
            derivation_salt: decode_fixed("derivation_salt", &record.derivation_salt)?,
            canary: Canary::decode(&record.canary)?,
            kdf: record.kdf,
        })
    }
}

/// Password -> Argon2id -> PBKDF2 -> key material. Intermediates are
/// wiped before returning.
fn derive_key_material(
    password: &str,
    verification_salt: &[u8],
    derivation_salt: &[u8],
    params: &KdfParams,
) -> Result<KeyMaterial> {
    let mut hardened = harden_password(password.as_bytes(), verification_salt, params)?;
    let derived = derive_key(&hardened, derivation_salt, params.pbkdf2_iterations);
    hardened.zeroize();

    let mut bytes = derived?;
    let key = KeyMaterial::new(bytes, params.pbkdf2_iterations);
    bytes.zeroize();
    Ok(key)
}

/// Decode a base64 field, reporting failures as a malformed record.
pub(crate) fn decode_field(name: &str, text: &str) -> Result<Vec<u8>> {
    decode(text).map_err(|e| SecretStoreError::MalformedRecord(format!("{name}: {e}")))
}

/// Decode a base64 field that must be exactly `N` bytes long.
pub(crate) fn decode_fixed<const N: usize>(name: &str, text: &str) -> Result<[u8; N]> {
    let bytes = decode_field(name, text)?;
    bytes.as_slice().try_into().map_err(|_| {
        SecretStoreError::MalformedRecord(format!(
            "{name}: expected {N} bytes, got {}",
            bytes.len()
        ))
    })
}

//! Integration tests for the SecretStore crypto layer.

use proptest::prelude::*;
use secretstore::crypto::{
    decode, decrypt, derive_key, encode, encrypt, generate_nonce, generate_salt, harden_password,
    KdfParams, KeyMaterial, NONCE_LEN, SALT_LEN, TAG_LEN,
};
use secretstore::errors::SecretStoreError;

fn fast() -> KdfParams {
    KdfParams {
        argon2_memory_kib: 8_192,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        pbkdf2_iterations: 1_000,
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn encoding_is_url_safe() {
    let text = encode(&[0xfb, 0xff, 0xfe]);
    assert!(!text.contains('+'));
    assert!(!text.contains('/'));
    assert_eq!(decode(&text).unwrap(), [0xfb, 0xff, 0xfe]);
}

#[test]
fn decoding_garbage_is_an_encoding_error() {
    assert!(matches!(
        decode("this is not base64!"),
        Err(SecretStoreError::Encoding(_))
    ));
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_key_is_deterministic() {
    let salt = [7u8; SALT_LEN];
    let a = derive_key(b"password", &salt, 1_000).unwrap();
    let b = derive_key(b"password", &salt, 1_000).unwrap();
    assert_eq!(a, b);
}

#[test]
fn derive_key_depends_on_every_input() {
    let salt = [7u8; SALT_LEN];
    let base = derive_key(b"password", &salt, 1_000).unwrap();

    assert_ne!(base, derive_key(b"Password", &salt, 1_000).unwrap());
    assert_ne!(base, derive_key(b"password", &[8u8; SALT_LEN], 1_000).unwrap());
    assert_ne!(base, derive_key(b"password", &salt, 1_001).unwrap());
}

#[test]
fn hardening_depends_on_salt() {
    let a = harden_password(b"password", &[1u8; SALT_LEN], &fast()).unwrap();
    let b = harden_password(b"password", &[2u8; SALT_LEN], &fast()).unwrap();
    assert_ne!(a, b);
}

#[test]
fn weak_kdf_params_are_rejected() {
    let params = KdfParams {
        argon2_memory_kib: 1_024,
        ..fast()
    };
    assert!(matches!(
        harden_password(b"password", &[1u8; SALT_LEN], &params),
        Err(SecretStoreError::KeyDerivation(_))
    ));
}

#[test]
fn record_keys_differ_per_salt() {
    let key = KeyMaterial::new([3u8; 32], 1_000);
    let a = key.derive_record_key(&generate_salt()).unwrap();
    let b = key.derive_record_key(&generate_salt()).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn key_material_debug_hides_bytes() {
    let key = KeyMaterial::new([0xab; 32], 1_000);
    let debug = format!("{key:?}");
    assert!(!debug.contains("171"));
    assert!(!debug.to_lowercase().contains("abab"));
}

// ---------------------------------------------------------------------------
// Authenticated encryption
// ---------------------------------------------------------------------------

#[test]
fn same_plaintext_different_nonce_differs() {
    let key = [9u8; 32];
    let a = encrypt(b"same", &key, &generate_nonce(), b"").unwrap();
    let b = encrypt(b"same", &key, &generate_nonce(), b"").unwrap();
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn wrong_associated_data_is_rejected() {
    let key = [9u8; 32];
    let nonce = generate_nonce();
    let sealed = encrypt(b"hunter2", &key, &nonce, b"email").unwrap();

    assert!(matches!(
        decrypt(&sealed.ciphertext, &sealed.auth_tag, &key, &nonce, b"bank"),
        Err(SecretStoreError::Authentication)
    ));
}

#[test]
fn truncated_tag_or_nonce_is_rejected() {
    let key = [9u8; 32];
    let nonce = generate_nonce();
    let sealed = encrypt(b"hunter2", &key, &nonce, b"").unwrap();

    assert!(decrypt(&sealed.ciphertext, &sealed.auth_tag[..TAG_LEN - 1], &key, &nonce, b"").is_err());
    assert!(decrypt(&sealed.ciphertext, &sealed.auth_tag, &key, &nonce[..NONCE_LEN - 1], b"").is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn encrypt_then_decrypt_roundtrips(
        plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        aad in proptest::collection::vec(any::<u8>(), 0..32),
        key in any::<[u8; 32]>(),
    ) {
        let nonce = generate_nonce();
        let sealed = encrypt(&plaintext, &key, &nonce, &aad).unwrap();
        let opened = decrypt(&sealed.ciphertext, &sealed.auth_tag, &key, &nonce, &aad).unwrap();
        prop_assert_eq!(opened, plaintext);
    }

    #[test]
    fn any_flipped_bit_is_rejected(
        plaintext in proptest::collection::vec(any::<u8>(), 1..128),
        bit in any::<prop::sample::Index>(),
    ) {
        let key = [5u8; 32];
        let nonce = generate_nonce();
        let sealed = encrypt(&plaintext, &key, &nonce, b"label").unwrap();

        let mut ciphertext = sealed.ciphertext.clone();
        let mut tag = sealed.auth_tag;
        let total_bits = (ciphertext.len() + TAG_LEN) * 8;
        let bit = bit.index(total_bits);
        let (byte, mask) = (bit / 8, 1u8 << (bit % 8));
        if byte < ciphertext.len() {
            ciphertext[byte] ^= mask;
        } else {
            tag[byte - ciphertext.len()] ^= mask;
        }

        let result = decrypt(&ciphertext, &tag, &key, &nonce, b"label");
        prop_assert!(matches!(result, Err(SecretStoreError::Authentication)));
    }
}

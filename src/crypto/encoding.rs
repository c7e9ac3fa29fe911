//! Binary-to-text encoding for stored fields.
//!
//! Every binary value (salts, nonces, ciphertexts, tags) is stored as
//! URL-safe base64 with padding so it fits in a TEXT column and in the
//! JSON interchange document without escaping.

use base64::engine::general_purpose::URL_SAFE as BASE64;
use base64::Engine;

use crate::errors::{Result, SecretStoreError};

/// Encode raw bytes for storage. Inverse of [`decode`].
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a stored string back to raw bytes. Inverse of [`encode`].
pub fn decode(text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text)
        .map_err(|e| SecretStoreError::Encoding(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_url_safe_alphabet() {
        let encoded = encode(&[0xfb, 0xff, 0xfe]);
        assert_eq!(encoded, "-__-");
        assert_eq!(decode(&encoded).unwrap(), vec![0xfb, 0xff, 0xfe]);
    }

    #[test]
    fn decode_rejects_standard_alphabet_symbols() {
        assert!(decode("+//+").is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode("not base64!").unwrap_err();
        assert!(matches!(err, SecretStoreError::Encoding(_)));
    }

    #[test]
    fn empty_input_roundtrips() {
        assert_eq!(encode(b""), "");
        assert!(decode("").unwrap().is_empty());
    }
}

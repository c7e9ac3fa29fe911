use std::fmt;

use thiserror::Error;

/// Which half of a password rotation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationStage {
    /// Decrypting a secret under the old key material, or re-encrypting
    /// it under the new one. Nothing has been written yet.
    ReEncrypt { label: String },
    /// Writing the re-encrypted secrets or the new master password.
    Persist,
}

impl fmt::Display for RotationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReEncrypt { label } => write!(f, "re-encrypting secret '{label}'"),
            Self::Persist => f.write_str("persisting rotated records"),
        }
    }
}

/// Coarse classification of an error, for callers that map failures to
/// user messages or exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Weakness,
    Authentication,
    MalformedRecord,
    Repository,
    Other,
}

/// All errors that can occur in SecretStore.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    // --- Core errors ---
    #[error("Password too short: minimum {min} characters")]
    Weakness { min: usize },

    #[error("Authentication failed: wrong password or tampered data")]
    Authentication,

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Password rotation failed while {stage}: {source}")]
    Rotation {
        stage: RotationStage,
        #[source]
        source: Box<SecretStoreError>,
    },

    // --- Crypto errors ---
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    // --- Vault errors ---
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Vault already initialized — refusing to import over existing data")]
    VaultAlreadyInitialized,

    #[error("Vault not initialized — no master password stored")]
    VaultNotInitialized,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl SecretStoreError {
    /// Classify this error. A rotation failure reports the kind of the
    /// error that caused it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Weakness { .. } => ErrorKind::Weakness,
            Self::Authentication => ErrorKind::Authentication,
            Self::MalformedRecord(_) => ErrorKind::MalformedRecord,
            Self::Repository(_) => ErrorKind::Repository,
            Self::Rotation { source, .. } => source.kind(),
            _ => ErrorKind::Other,
        }
    }
}

impl From<rusqlite::Error> for SecretStoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Repository(e.to_string())
    }
}

/// Convenience type alias for SecretStore results.
pub type Result<T> = std::result::Result<T, SecretStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_reports_kind_of_cause() {
        let err = SecretStoreError::Rotation {
            stage: RotationStage::Persist,
            source: Box::new(SecretStoreError::Repository("disk full".into())),
        };
        assert_eq!(err.kind(), ErrorKind::Repository);
        assert!(err.to_string().contains("persisting"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn rotation_names_the_failing_label() {
        let err = SecretStoreError::Rotation {
            stage: RotationStage::ReEncrypt {
                label: "email".into(),
            },
            source: Box::new(SecretStoreError::Authentication),
        };
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().contains("'email'"));
    }

    #[test]
    fn core_kinds_are_distinct() {
        assert_eq!(
            SecretStoreError::Weakness { min: 8 }.kind(),
            ErrorKind::Weakness
        );
        assert_eq!(
            SecretStoreError::MalformedRecord("x".into()).kind(),
            ErrorKind::MalformedRecord
        );
        assert_eq!(
            SecretStoreError::Encoding("x".into()).kind(),
            ErrorKind::Other
        );
    }
}

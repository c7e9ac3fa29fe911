//! Vault module — the key hierarchy and encrypted records.
//!
//! This module provides:
//! - `MasterPassword` and its stored form `PasswordRecord` (`password`)
//! - `Secret` and its stored form `SecretRecord` (`secret`)
//! - `VaultSession`, an unlocked vault bound to a repository (`session`)
//! - `VaultDocument` bulk export / import (`interchange`)

pub mod interchange;
pub mod password;
pub mod secret;
pub mod session;

// Re-export the most commonly used items.
pub use interchange::{export_document, import_document, VaultDocument};
pub use password::{check_strength, MasterPassword, PasswordRecord, MIN_PASSWORD_LEN, SCHEME_VERSION};
pub use secret::{Secret, SecretRecord};
pub use session::{validate_label, VaultSession, MAX_LABEL_LEN};

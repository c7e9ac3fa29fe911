//! Bulk export / import of a whole vault.
//!
//! A [`VaultDocument`] carries the stored records verbatim: nothing is
//! decrypted or re-derived, so a round trip reproduces identical fields.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{Result, SecretStoreError};
use crate::store::Repository;

use super::password::{MasterPassword, PasswordRecord};
use super::secret::{Secret, SecretRecord};

/// Every record of one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub master_password: PasswordRecord,
    pub secrets: Vec<SecretRecord>,
}

impl VaultDocument {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SecretStoreError::Serialization(format!("vault document: {e}")))
    }

    /// Parse a document. Missing or mistyped fields are a
    /// `MalformedRecord` error.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| SecretStoreError::MalformedRecord(format!("vault document: {e}")))
    }

    /// Write the document to `path` atomically (temp file + rename).
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        let parent = path.parent().unwrap_or(Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        // A stale temp file would keep its old permissions.
        match fs::remove_file(&tmp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // The export holds the canary and every ciphertext: owner-only
        // from the moment the file exists.
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Copy every stored record into a document, secrets sorted by label.
pub fn export_document<R: Repository + ?Sized>(repository: &R) -> Result<VaultDocument> {
    let master_password = repository
        .load_master_password()?
        .ok_or(SecretStoreError::VaultNotInitialized)?;

    let mut secrets = repository.list_secrets()?;
    secrets.sort_by(|a, b| a.label.cmp(&b.label));

    debug!(secrets = secrets.len(), "exported vault document");
    Ok(VaultDocument {
        exported_at: Some(Utc::now()),
        master_password,
        secrets,
    })
}

/// Write every record of `document` into an empty `repository`.
///
/// Each record is parsed into its domain type first, so nothing is
/// written unless the whole document is well formed. Returns the number
/// of secrets imported.
pub fn import_document<R: Repository + ?Sized>(
    repository: &mut R,
    document: &VaultDocument,
) -> Result<usize> {
    if repository.load_master_password()?.is_some() {
        return Err(SecretStoreError::VaultAlreadyInitialized);
    }

    MasterPassword::from_record(&document.master_password)?;

    let mut seen = BTreeSet::new();
    for record in &document.secrets {
        Secret::from_record(record)?;
        if !seen.insert(record.label.as_str()) {
            return Err(SecretStoreError::MalformedRecord(format!(
                "duplicate label '{}'",
                record.label
            )));
        }
    }

    // Same shape of write as a rotation: all secrets, then the password.
    repository.commit_rotation(&document.master_password, &document.secrets)?;

    info!(secrets = document.secrets.len(), "imported vault document");
    Ok(document.secrets.len())
}

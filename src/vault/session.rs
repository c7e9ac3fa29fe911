//! An unlocked vault bound to a repository.
//!
//! `VaultSession` is the only place that holds live key material. It is
//! obtained by opening a repository with a password, which either verifies
//! the stored master password or, for an empty repository, creates one.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::{KdfParams, KeyMaterial};
use crate::errors::{Result, RotationStage, SecretStoreError};
use crate::store::Repository;

use super::interchange::{self, VaultDocument};
use super::password::{check_strength, MasterPassword};
use super::secret::{Secret, SecretRecord};

/// Maximum label length, in characters.
pub const MAX_LABEL_LEN: usize = 256;

/// An open vault. Dropping it scrubs the key material.
pub struct VaultSession<R: Repository> {
    repository: R,
    master_password: MasterPassword,
    key: KeyMaterial,
    /// Parameters for passwords created during this session.
    params: KdfParams,
}

impl<R: Repository> VaultSession<R> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open `repository` with `password`, using default KDF parameters if a
    /// new master password has to be created.
    pub fn open(repository: R, password: &str) -> Result<Self> {
        Self::open_with_params(repository, password, &KdfParams::default())
    }

    /// Open `repository` with `password`.
    ///
    /// If the repository holds a master password, `password` must verify
    /// against it (`Authentication` otherwise). If it does not, a new
    /// master password is created with `params` and persisted; a password
    /// that is too short fails with `Weakness` before anything is written.
    pub fn open_with_params(mut repository: R, password: &str, params: &KdfParams) -> Result<Self> {
        let (master_password, key) = match repository.load_master_password()? {
            Some(record) => {
                let master = MasterPassword::from_record(&record)?;
                let key = master.verify(password)?;
                debug!("verified master password");
                (master, key)
            }
            None => {
                let (master, key) = MasterPassword::create_activated(password, params)?;
                repository.save_master_password(&master.to_record())?;
                info!("created new vault");
                (master, key)
            }
        };

        Ok(Self {
            repository,
            master_password,
            key,
            params: *params,
        })
    }

    /// Import `document` into an empty `repository`, then open it.
    ///
    /// The records are written before the password is checked, so a wrong
    /// password fails with `Authentication` after a successful import.
    pub fn open_from_document(
        mut repository: R,
        password: &str,
        document: &VaultDocument,
        params: &KdfParams,
    ) -> Result<Self> {
        interchange::import_document(&mut repository, document)?;
        Self::open_with_params(repository, password, params)
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Store `plaintext` under `label`, replacing any existing content.
    pub fn write(&mut self, label: &str, plaintext: &str) -> Result<()> {
        validate_label(label)?;

        let loaded = self
            .repository
            .load_secret(label)
            .and_then(|record| record.map(|r| Secret::from_record(&r)).transpose());
        let existing = match loaded {
            Ok(secret) => secret,
            // Replacing keeps only the label, so a damaged record is
            // simply written over.
            Err(SecretStoreError::MalformedRecord(reason)) => {
                warn!(label, %reason, "overwriting malformed secret record");
                None
            }
            Err(e) => return Err(e),
        };

        let secret = match existing {
            Some(mut secret) => {
                secret.replace(plaintext, &self.key)?;
                debug!(label, "replaced secret");
                secret
            }
            None => {
                let secret = Secret::create(label, plaintext, &self.key)?;
                debug!(label, "created secret");
                secret
            }
        };

        self.repository.save_secret(&secret.to_record())
    }

    /// Decrypt the secret stored under `label`, or `None` if there is none.
    pub fn read(&self, label: &str) -> Result<Option<String>> {
        let Some(record) = self.repository.load_secret(label)? else {
            return Ok(None);
        };
        let secret = Secret::from_record(&record)?;
        secret.decrypt(&self.key).map(Some)
    }

    /// Remove the secret stored under `label`. Absent labels are ignored.
    pub fn delete(&mut self, label: &str) -> Result<()> {
        self.repository.delete_secret(label)?;
        debug!(label, "deleted secret");
        Ok(())
    }

    pub fn list_labels(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .repository
            .list_secrets()?
            .into_iter()
            .map(|record| record.label)
            .collect())
    }

    pub fn contains(&self, label: &str) -> Result<bool> {
        Ok(self.repository.load_secret(label)?.is_some())
    }

    // ------------------------------------------------------------------
    // Password rotation
    // ------------------------------------------------------------------

    /// Replace the master password and re-encrypt every secret under it.
    ///
    /// 1. The new password is checked for strength before any crypto.
    /// 2. Every secret is decrypted with the current key material and
    ///    re-encrypted with the new one, entirely in memory.
    /// 3. The complete set and the new master password are handed to the
    ///    repository in one `commit_rotation` call.
    ///
    /// The session keeps its current key material until step 3 succeeds.
    /// Failures in step 2 write nothing. Failures in step 3 are atomic on
    /// transactional repositories; on others the original records are
    /// written back, and if that also fails the store may hold a mix of
    /// old and new records.
    pub fn rotate_password(&mut self, new_password: &str) -> Result<()> {
        check_strength(new_password)?;

        let records = self.repository.list_secrets()?;
        let (new_master, new_key) = MasterPassword::create_activated(new_password, &self.params)?;

        let mut rotated: Vec<SecretRecord> = Vec::with_capacity(records.len());
        for record in &records {
            let secret = self.reencrypt(record, &new_key).map_err(|e| {
                warn!(label = %record.label, "rotation aborted before any write");
                SecretStoreError::Rotation {
                    stage: RotationStage::ReEncrypt {
                        label: record.label.clone(),
                    },
                    source: Box::new(e),
                }
            })?;
            rotated.push(secret.to_record());
        }

        if let Err(e) = self
            .repository
            .commit_rotation(&new_master.to_record(), &rotated)
        {
            warn!(secrets = rotated.len(), "rotation failed while persisting");
            self.restore(&records);
            return Err(SecretStoreError::Rotation {
                stage: RotationStage::Persist,
                source: Box::new(e),
            });
        }

        self.master_password = new_master;
        self.key = new_key;
        info!(secrets = rotated.len(), "rotated master password");
        Ok(())
    }

    /// Best effort: write back the records as they were before a failed
    /// commit. Needed only on repositories without transactions.
    fn restore(&mut self, records: &[SecretRecord]) {
        let password = self.master_password.to_record();
        match self.repository.commit_rotation(&password, records) {
            Ok(()) => debug!(secrets = records.len(), "restored pre-rotation records"),
            Err(e) => warn!(error = %e, "could not restore pre-rotation records"),
        }
    }

    fn reencrypt(&self, record: &SecretRecord, new_key: &KeyMaterial) -> Result<Secret> {
        let mut secret = Secret::from_record(record)?;
        let plaintext = Zeroizing::new(secret.decrypt(&self.key)?);
        secret.replace(&plaintext, new_key)?;
        Ok(secret)
    }

    // ------------------------------------------------------------------
    // Interchange & accessors
    // ------------------------------------------------------------------

    /// Copy the stored records into a bulk document.
    pub fn export_document(&self) -> Result<VaultDocument> {
        interchange::export_document(&self.repository)
    }

    pub fn master_password(&self) -> &MasterPassword {
        &self.master_password
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Close the session and hand back the repository.
    pub fn into_repository(self) -> R {
        self.repository
    }
}

/// Labels must be non-empty, at most [`MAX_LABEL_LEN`] characters, and
/// free of control characters.
pub fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(SecretStoreError::InvalidLabel("label cannot be empty".into()));
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(SecretStoreError::InvalidLabel(format!(
            "label cannot exceed {MAX_LABEL_LEN} characters"
        )));
    }
    if label.chars().any(char::is_control) {
        return Err(SecretStoreError::InvalidLabel(format!(
            "label {label:?} contains control characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRepository;

    fn fast() -> KdfParams {
        KdfParams {
            argon2_memory_kib: 8_192,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            pbkdf2_iterations: 1_000,
        }
    }

    fn open(repo: MemoryRepository, password: &str) -> Result<VaultSession<MemoryRepository>> {
        VaultSession::open_with_params(repo, password, &fast())
    }

    #[test]
    fn open_empty_repository_creates_password() {
        let session = open(MemoryRepository::new(), "password1").unwrap();
        assert!(session.repository().load_master_password().unwrap().is_some());
        assert!(session.list_labels().unwrap().is_empty());
    }

    #[test]
    fn short_password_writes_nothing() {
        let err = open(MemoryRepository::new(), "short").err().unwrap();
        assert!(matches!(err, SecretStoreError::Weakness { min: 8 }));
    }

    #[test]
    fn write_overwrites_malformed_record() {
        let mut repo = MemoryRepository::new();
        repo.save_secret(&SecretRecord {
            label: "example".into(),
            private_salt: "not base64!".into(),
            nonce: "???".into(),
            ciphertext: String::new(),
            auth_tag: String::new(),
        })
        .unwrap();

        let mut session = open(repo, "password1").unwrap();
        assert!(matches!(
            session.read("example"),
            Err(SecretStoreError::MalformedRecord(_))
        ));

        session.write("example", "repaired").unwrap();
        assert_eq!(session.repository().secret_count(), 1);
        assert_eq!(session.read("example").unwrap().as_deref(), Some("repaired"));
    }

    #[test]
    fn write_overwrites_in_place() {
        let mut session = open(MemoryRepository::new(), "password1").unwrap();
        session.write("example", "first").unwrap();
        session.write("example", "second").unwrap();

        assert_eq!(session.repository().secret_count(), 1);
        assert_eq!(session.read("example").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn read_missing_label_is_none() {
        let session = open(MemoryRepository::new(), "password1").unwrap();
        assert_eq!(session.read("nothing").unwrap(), None);
    }

    #[test]
    fn delete_missing_label_is_ok() {
        let mut session = open(MemoryRepository::new(), "password1").unwrap();
        session.delete("nothing").unwrap();
    }

    #[test]
    fn invalid_labels_are_rejected() {
        let mut session = open(MemoryRepository::new(), "password1").unwrap();
        let too_long = "x".repeat(MAX_LABEL_LEN + 1);
        for label in ["", "bad\0label", "tab\tlabel", too_long.as_str()] {
            assert!(matches!(
                session.write(label, "value"),
                Err(SecretStoreError::InvalidLabel(_))
            ));
        }
        session.write(&"x".repeat(MAX_LABEL_LEN), "value").unwrap();
        session.write("spaces are fine", "value").unwrap();
    }

    #[test]
    fn rotation_keeps_session_usable() {
        let mut session = open(MemoryRepository::new(), "password1").unwrap();
        session.write("a", "alpha").unwrap();
        session.rotate_password("password2").unwrap();

        assert_eq!(session.read("a").unwrap().as_deref(), Some("alpha"));
        session.write("b", "beta").unwrap();

        let repo = session.into_repository();
        let reopened = open(repo, "password2").unwrap();
        assert_eq!(reopened.read("b").unwrap().as_deref(), Some("beta"));
    }

    #[test]
    fn weak_rotation_changes_nothing() {
        let mut session = open(MemoryRepository::new(), "password1").unwrap();
        session.write("a", "alpha").unwrap();
        let before = session.repository().load_master_password().unwrap();

        assert!(matches!(
            session.rotate_password("short"),
            Err(SecretStoreError::Weakness { .. })
        ));
        assert_eq!(session.repository().load_master_password().unwrap(), before);
    }
}

//! Persistence boundary for vault records.
//!
//! The vault core never touches storage directly; it goes through the
//! [`Repository`] trait, which deals only in structural records
//! ([`PasswordRecord`], [`SecretRecord`]). Two backends are provided:
//!
//! - `MemoryRepository` — in-process maps, used by tests and imports
//! - `SqliteRepository` — a single SQLite database file

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use crate::errors::Result;
use crate::vault::{PasswordRecord, SecretRecord};

/// Storage for one vault: a single master password slot plus secrets
/// keyed by label.
///
/// Implementations must keep at most one record per label and must not
/// partially apply a failed save.
pub trait Repository {
    /// Insert or replace the master password.
    fn save_master_password(&mut self, record: &PasswordRecord) -> Result<()>;

    fn load_master_password(&self) -> Result<Option<PasswordRecord>>;

    /// Insert or replace the secret with `record.label`.
    fn save_secret(&mut self, record: &SecretRecord) -> Result<()>;

    fn load_secret(&self, label: &str) -> Result<Option<SecretRecord>>;

    /// Remove the secret with `label`. Absent labels are not an error.
    fn delete_secret(&mut self, label: &str) -> Result<()>;

    fn list_secrets(&self) -> Result<Vec<SecretRecord>>;

    /// Persist the outcome of a password rotation.
    ///
    /// The default saves every secret, then the password, one record at a
    /// time: a failure part-way leaves a mix of old and new records.
    /// Backends with transactions override this to commit all or nothing.
    fn commit_rotation(
        &mut self,
        password: &PasswordRecord,
        secrets: &[SecretRecord],
    ) -> Result<()> {
        for record in secrets {
            self.save_secret(record)?;
        }
        self.save_master_password(password)
    }
}

impl<R: Repository + ?Sized> Repository for &mut R {
    fn save_master_password(&mut self, record: &PasswordRecord) -> Result<()> {
        (**self).save_master_password(record)
    }

    fn load_master_password(&self) -> Result<Option<PasswordRecord>> {
        (**self).load_master_password()
    }

    fn save_secret(&mut self, record: &SecretRecord) -> Result<()> {
        (**self).save_secret(record)
    }

    fn load_secret(&self, label: &str) -> Result<Option<SecretRecord>> {
        (**self).load_secret(label)
    }

    fn delete_secret(&mut self, label: &str) -> Result<()> {
        (**self).delete_secret(label)
    }

    fn list_secrets(&self) -> Result<Vec<SecretRecord>> {
        (**self).list_secrets()
    }

    fn commit_rotation(
        &mut self,
        password: &PasswordRecord,
        secrets: &[SecretRecord],
    ) -> Result<()> {
        (**self).commit_rotation(password, secrets)
    }
}

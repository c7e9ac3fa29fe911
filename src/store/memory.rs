//! In-memory repository.
//!
//! Useful for tests and as a staging area. All data is lost on drop.

use std::collections::BTreeMap;

use crate::errors::{Result, SecretStoreError};
use crate::vault::{PasswordRecord, SecretRecord};

use super::Repository;

#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    master_password: Option<PasswordRecord>,
    secrets: BTreeMap<String, SecretRecord>,
    /// Number of secret saves left before the injected failure.
    failing_after: Option<usize>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the next `successes` calls to `save_secret` succeed, then fail
    /// the one after with a repository error. Later saves succeed again.
    /// Used to exercise partial failures.
    pub fn fail_secret_saves_after(&mut self, successes: usize) {
        self.failing_after = Some(successes);
    }

    /// Cancel a pending failure set with
    /// [`fail_secret_saves_after`](Self::fail_secret_saves_after).
    pub fn stop_failing(&mut self) {
        self.failing_after = None;
    }

    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }
}

impl Repository for MemoryRepository {
    fn save_master_password(&mut self, record: &PasswordRecord) -> Result<()> {
        self.master_password = Some(record.clone());
        Ok(())
    }

    fn load_master_password(&self) -> Result<Option<PasswordRecord>> {
        Ok(self.master_password.clone())
    }

    fn save_secret(&mut self, record: &SecretRecord) -> Result<()> {
        if let Some(remaining) = self.failing_after.as_mut() {
            if *remaining == 0 {
                self.failing_after = None;
                return Err(SecretStoreError::Repository(format!(
                    "injected failure saving '{}'",
                    record.label
                )));
            }
            *remaining -= 1;
        }

        self.secrets.insert(record.label.clone(), record.clone());
        Ok(())
    }

    fn load_secret(&self, label: &str) -> Result<Option<SecretRecord>> {
        Ok(self.secrets.get(label).cloned())
    }

    fn delete_secret(&mut self, label: &str) -> Result<()> {
        self.secrets.remove(label);
        Ok(())
    }

    fn list_secrets(&self) -> Result<Vec<SecretRecord>> {
        Ok(self.secrets.values().cloned().collect())
    }
}

//! SQLite-backed repository.
//!
//! One database file holds one vault:
//!
//! - `master_password` — a single row (`id = 1`)
//! - `secret` — one row per label (`label` is the primary key)
//!
//! Saves are upserts. Rotation commits inside a single transaction, so a
//! failed rotation leaves the database exactly as it was.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::crypto::KdfParams;
use crate::errors::{Result, SecretStoreError};
use crate::vault::{PasswordRecord, SecretRecord};

use super::Repository;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS master_password (
        id                 INTEGER PRIMARY KEY CHECK (id = 1),
        scheme             INTEGER NOT NULL,
        verification_salt  TEXT NOT NULL,
        derivation_salt    TEXT NOT NULL,
        canary             TEXT NOT NULL,
        argon2_memory_kib  INTEGER NOT NULL,
        argon2_iterations  INTEGER NOT NULL,
        argon2_parallelism INTEGER NOT NULL,
        pbkdf2_iterations  INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS secret (
        label        TEXT PRIMARY KEY NOT NULL,
        private_salt TEXT NOT NULL,
        nonce        TEXT NOT NULL,
        ciphertext   TEXT NOT NULL,
        auth_tag     TEXT NOT NULL
    );";

const UPSERT_PASSWORD: &str = "
    INSERT INTO master_password (
        id, scheme, verification_salt, derivation_salt, canary,
        argon2_memory_kib, argon2_iterations, argon2_parallelism, pbkdf2_iterations
    ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(id) DO UPDATE SET
        scheme = excluded.scheme,
        verification_salt = excluded.verification_salt,
        derivation_salt = excluded.derivation_salt,
        canary = excluded.canary,
        argon2_memory_kib = excluded.argon2_memory_kib,
        argon2_iterations = excluded.argon2_iterations,
        argon2_parallelism = excluded.argon2_parallelism,
        pbkdf2_iterations = excluded.pbkdf2_iterations";

const UPSERT_SECRET: &str = "
    INSERT INTO secret (label, private_salt, nonce, ciphertext, auth_tag)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(label) DO UPDATE SET
        private_salt = excluded.private_salt,
        nonce = excluded.nonce,
        ciphertext = excluded.ciphertext,
        auth_tag = excluded.auth_tag";

const SELECT_SECRET: &str = "SELECT label, private_salt, nonce, ciphertext, auth_tag FROM secret";

/// A vault stored in one SQLite database.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Set restrictive permissions on the database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        debug!(path = %path.display(), "opened secret store database");
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Number of stored secrets.
    pub fn secret_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM secret", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Number of stored master password rows (0 or 1).
    pub fn master_password_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM master_password", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn upsert_password(conn: &Connection, record: &PasswordRecord) -> Result<()> {
    conn.execute(
        UPSERT_PASSWORD,
        params![
            record.scheme,
            record.verification_salt,
            record.derivation_salt,
            record.canary,
            record.kdf.argon2_memory_kib,
            record.kdf.argon2_iterations,
            record.kdf.argon2_parallelism,
            record.kdf.pbkdf2_iterations,
        ],
    )?;
    Ok(())
}

fn upsert_secret(conn: &Connection, record: &SecretRecord) -> Result<()> {
    conn.execute(
        UPSERT_SECRET,
        params![
            record.label,
            record.private_salt,
            record.nonce,
            record.ciphertext,
            record.auth_tag,
        ],
    )?;
    Ok(())
}

/// A column that cannot be read as its field type is a damaged record,
/// not a storage failure.
fn row_error(e: rusqlite::Error) -> SecretStoreError {
    match e {
        rusqlite::Error::FromSqlConversionFailure(index, ..)
        | rusqlite::Error::IntegralValueOutOfRange(index, _)
        | rusqlite::Error::InvalidColumnType(index, ..) => {
            SecretStoreError::MalformedRecord(format!("stored column {index}: {e}"))
        }
        other => other.into(),
    }
}

fn secret_from_row(row: &Row<'_>) -> rusqlite::Result<SecretRecord> {
    Ok(SecretRecord {
        label: row.get(0)?,
        private_salt: row.get(1)?,
        nonce: row.get(2)?,
        ciphertext: row.get(3)?,
        auth_tag: row.get(4)?,
    })
}

impl Repository for SqliteRepository {
    fn save_master_password(&mut self, record: &PasswordRecord) -> Result<()> {
        upsert_password(&self.conn, record)
    }

    fn load_master_password(&self) -> Result<Option<PasswordRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT scheme, verification_salt, derivation_salt, canary,
                        argon2_memory_kib, argon2_iterations, argon2_parallelism,
                        pbkdf2_iterations
                 FROM master_password WHERE id = 1",
                [],
                |row| {
                    Ok(PasswordRecord {
                        scheme: row.get(0)?,
                        verification_salt: row.get(1)?,
                        derivation_salt: row.get(2)?,
                        canary: row.get(3)?,
                        kdf: KdfParams {
                            argon2_memory_kib: row.get(4)?,
                            argon2_iterations: row.get(5)?,
                            argon2_parallelism: row.get(6)?,
                            pbkdf2_iterations: row.get(7)?,
                        },
                    })
                },
            )
            .optional()
            .map_err(row_error)?;
        Ok(record)
    }

    fn save_secret(&mut self, record: &SecretRecord) -> Result<()> {
        upsert_secret(&self.conn, record)
    }

    fn load_secret(&self, label: &str) -> Result<Option<SecretRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("{SELECT_SECRET} WHERE label = ?1"),
                [label],
                secret_from_row,
            )
            .optional()
            .map_err(row_error)?;
        Ok(record)
    }

    fn delete_secret(&mut self, label: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM secret WHERE label = ?1", [label])?;
        Ok(())
    }

    fn list_secrets(&self) -> Result<Vec<SecretRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_SECRET} ORDER BY label"))?;
        let rows = stmt.query_map([], secret_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(row_error)?);
        }
        Ok(records)
    }

    fn commit_rotation(
        &mut self,
        password: &PasswordRecord,
        secrets: &[SecretRecord],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        for record in secrets {
            upsert_secret(&tx, record)?;
        }
        upsert_password(&tx, password)?;
        tx.commit()?;

        debug!(secrets = secrets.len(), "committed rotation transaction");
        Ok(())
    }
}

//! Credential Store for SecurePass.
//!
//! Persists one row per credential in the `passwords` table. Passwords are
//! encrypted by the [`FieldCipher`] before they reach SQLite, and reads hand
//! back ciphertext only: plaintext appears when a caller explicitly asks
//! to reveal a record.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::database::{Database, MonotonicClock, StoredTimestamp};
use crate::services::field_cipher::{FieldCipher, FieldCipherTrait};
use crate::types::credential::{Credential, CredentialId, EncryptedField, UpdateOutcome};
use crate::types::errors::StoreError;

/// Trait defining credential persistence operations.
pub trait CredentialStoreTrait {
    fn list(&self) -> Result<Vec<Credential>, StoreError>;
    fn get(&self, id: CredentialId) -> Result<Option<Credential>, StoreError>;
    fn add(
        &self,
        account_type: &str,
        account_name: &str,
        username: &str,
        password: &str,
    ) -> Result<CredentialId, StoreError>;
    fn update(
        &self,
        id: CredentialId,
        account_type: &str,
        account_name: &str,
        username: &str,
        new_password: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError>;
    fn delete(&self, id: CredentialId) -> Result<bool, StoreError>;
    fn decrypt_password_for(
        &self,
        ciphertext: &str,
        iv: &str,
    ) -> Result<Zeroizing<String>, StoreError>;
    fn reveal(&self, credential: &Credential) -> Result<Zeroizing<String>, StoreError>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, account_type, account_name, username, encrypted_password, iv, created_at, updated_at FROM passwords";

/// Credential store backed by the shared SQLite handle and the field cipher.
pub struct CredentialStore {
    db: Arc<Database>,
    cipher: FieldCipher,
    clock: MonotonicClock,
}

impl CredentialStore {
    /// Creates a store over an already-open database.
    ///
    /// The mutation clock is seeded past the newest `updated_at` on disk so a
    /// restart with a lagging wall clock still moves touched records to the front.
    pub fn new(db: Arc<Database>, cipher: FieldCipher) -> Result<Self, StoreError> {
        let newest: Option<i64> = db
            .connection()
            .query_row("SELECT MAX(updated_at) FROM passwords", [], |row| row.get(0))?;
        let clock = match newest {
            Some(millis) => MonotonicClock::starting_after(millis),
            None => MonotonicClock::new(),
        };
        Ok(Self { db, cipher, clock })
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    fn row_to_credential(row: &Row<'_>) -> rusqlite::Result<Credential> {
        let created_at: StoredTimestamp = row.get(6)?;
        let updated_at: StoredTimestamp = row.get(7)?;
        Ok(Credential {
            id: row.get(0)?,
            account_type: row.get(1)?,
            account_name: row.get(2)?,
            username: row.get(3)?,
            password: EncryptedField::new(row.get(4)?, row.get(5)?),
            created_at: created_at.into_inner(),
            updated_at: updated_at.into_inner(),
        })
    }

    fn find(conn: &Connection, id: CredentialId) -> rusqlite::Result<Option<Credential>> {
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_COLUMNS),
            params![id],
            Self::row_to_credential,
        )
        .optional()
    }
}

impl CredentialStoreTrait for CredentialStore {
    /// All credentials, most recently touched first.
    fn list(&self) -> Result<Vec<Credential>, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY updated_at DESC, id DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_credential)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn get(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        Ok(Self::find(&self.db.connection(), id)?)
    }

    fn add(
        &self,
        account_type: &str,
        account_name: &str,
        username: &str,
        password: &str,
    ) -> Result<CredentialId, StoreError> {
        let sealed = self.cipher.encrypt(password)?;
        let now = StoredTimestamp::from(self.clock.now());

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO passwords (account_type, account_name, username, encrypted_password, iv, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                account_type,
                account_name,
                username,
                sealed.ciphertext(),
                sealed.iv(),
                now,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(id, "credential added");
        Ok(id)
    }

    /// Merges new labels into an existing record.
    ///
    /// A blank or absent `new_password` keeps the stored ciphertext/IV pair
    /// untouched; otherwise both are replaced by a fresh encryption.
    /// `updated_at` always advances.
    fn update(
        &self,
        id: CredentialId,
        account_type: &str,
        account_name: &str,
        username: &str,
        new_password: Option<&str>,
    ) -> Result<UpdateOutcome, StoreError> {
        let conn = self.db.connection();
        let Some(existing) = Self::find(&conn, id)? else {
            debug!(id, "update skipped: no such credential");
            return Ok(UpdateOutcome::NotFound);
        };

        let (sealed, rotated) = match new_password.filter(|p| !p.trim().is_empty()) {
            Some(password) => (self.cipher.encrypt(password)?, true),
            None => (existing.password, false),
        };
        let now = StoredTimestamp::from(self.clock.now());

        conn.execute(
            "UPDATE passwords SET account_type = ?1, account_name = ?2, username = ?3, encrypted_password = ?4, iv = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                account_type,
                account_name,
                username,
                sealed.ciphertext(),
                sealed.iv(),
                now,
                id
            ],
        )?;
        info!(id, password_rotated = rotated, "credential updated");
        Ok(UpdateOutcome::Updated)
    }

    /// Removes a credential. Returns `false` when there was nothing to remove.
    fn delete(&self, id: CredentialId) -> Result<bool, StoreError> {
        let removed = self
            .db
            .connection()
            .execute("DELETE FROM passwords WHERE id = ?1", params![id])?;
        if removed > 0 {
            info!(id, "credential deleted");
        }
        Ok(removed > 0)
    }

    fn decrypt_password_for(
        &self,
        ciphertext: &str,
        iv: &str,
    ) -> Result<Zeroizing<String>, StoreError> {
        Ok(self.cipher.decrypt(ciphertext, iv)?)
    }

    fn reveal(&self, credential: &Credential) -> Result<Zeroizing<String>, StoreError> {
        debug!(id = credential.id, "revealing credential password");
        Ok(self.cipher.decrypt_field(&credential.password)?)
    }
}

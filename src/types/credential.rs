use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Surrogate key of a stored credential, assigned by the database.
pub type CredentialId = i64;

/// A password encrypted by the field cipher, with the IV it was sealed under.
///
/// Both halves are base64 text. Values only come from `FieldCipher::encrypt` or
/// from rows previously written by it, so a pair is never assembled by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedField {
    ciphertext: String,
    iv: String,
}

impl EncryptedField {
    pub(crate) fn new(ciphertext: String, iv: String) -> Self {
        Self { ciphertext, iv }
    }

    /// Base64 of the AES-GCM ciphertext with the authentication tag appended.
    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }

    /// Base64 of the 96-bit IV.
    pub fn iv(&self) -> &str {
        &self.iv
    }
}

/// Represents a stored credential entry with its encrypted password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub id: CredentialId,
    pub account_type: String,
    pub account_name: String,
    pub username: String,
    pub password: EncryptedField,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn encrypted_password(&self) -> &str {
        self.password.ciphertext()
    }

    pub fn iv(&self) -> &str {
        self.password.iv()
    }
}

/// Result of `CredentialStore::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record existed and was rewritten.
    Updated,
    /// No record has that id; nothing was written.
    NotFound,
}

/// Form submitted when adding a credential.
#[derive(Debug, Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct NewCredentialForm {
    pub account_type: String,
    pub account_name: String,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Form submitted when editing a credential. An empty `new_password` keeps the stored one.
#[derive(Debug, Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct EditCredentialForm {
    pub account_type: String,
    pub account_name: String,
    pub username: String,
    pub new_password: String,
    pub password_confirm: String,
}

impl EditCredentialForm {
    /// The replacement password, if the user typed one.
    pub fn replacement_password(&self) -> Option<&str> {
        if self.new_password.trim().is_empty() {
            None
        } else {
            Some(&self.new_password)
        }
    }
}

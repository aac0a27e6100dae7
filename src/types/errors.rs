use thiserror::Error;

use super::credential::CredentialId;

// === KeyStoreError ===

/// Errors raised by the secure key facility or the key manager on top of it.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// The facility (OS keychain, secret service) could not be reached or refused the request.
    #[error("Secure key facility unavailable: {0}")]
    Unavailable(String),
    /// The facility returned material that is not a usable key.
    #[error("Stored key is corrupted: {0}")]
    Corrupted(String),
    /// Key material had the wrong size.
    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    /// The system random source failed while generating a key.
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),
}

// === CryptoError ===

/// Errors related to field encryption and decryption.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The vault key could not be obtained.
    #[error("Key unavailable: {0}")]
    Key(#[from] KeyStoreError),
    /// Failed to generate a fresh IV.
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),
    /// Encryption operation failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),
    /// A stored field is not valid text-encoded data.
    #[error("Malformed {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },
    /// The IV does not have the length the cipher requires.
    #[error("Invalid IV length: expected {expected}, got {got}")]
    InvalidIvLength { expected: usize, got: usize },
    /// The authentication tag did not validate: tampered ciphertext, wrong IV or wrong key.
    #[error("Decryption integrity failure: ciphertext, IV or key does not match")]
    IntegrityFailure,
    /// Authenticated plaintext is not UTF-8.
    #[error("Decrypted password is not valid UTF-8")]
    InvalidUtf8,
}

impl CryptoError {
    /// True for failures that indicate tampering or corruption of a stored pair.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, CryptoError::IntegrityFailure)
    }
}

// === StoreError ===

/// Errors related to credential persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persistence engine reported an error.
    #[error("Storage failure: {0}")]
    Database(#[from] rusqlite::Error),
    /// Encrypting or decrypting a password failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// A background storage task could not be joined.
    #[error("Background task failed: {0}")]
    Background(String),
}

impl StoreError {
    /// True if the underlying failure is a decryption integrity failure.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, StoreError::Crypto(e) if e.is_integrity_failure())
    }
}

// === AuthError ===

/// Errors produced by the biometric gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The biometric sample was rejected.
    #[error("Authentication failed. Please try again.")]
    Failed,
    /// The prompt reported an error (cancelled, lockout, hardware error).
    #[error("Authentication error: {0}")]
    Prompt(String),
    /// No biometric hardware on this device.
    #[error("Biometric authentication is not available on this device")]
    NotAvailable,
    /// Hardware present but nothing enrolled.
    #[error("No biometric credential is enrolled on this device")]
    NotEnrolled,
    /// A vault operation was attempted before the gate was passed.
    #[error("Vault is locked: authenticate first")]
    Locked,
}

// === ValidationError ===

/// A single rejected form field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Account type is required")]
    AccountTypeRequired,
    #[error("Username is required")]
    UsernameRequired,
    #[error("Username must be a valid email address")]
    UsernameNotEmail,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// All field errors found in one form submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid input: {}", join_messages(.0))]
pub struct ValidationFailure(pub Vec<ValidationError>);

impl ValidationFailure {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
}

// === VaultError ===

/// Top-level error for application wiring and the RPC surface.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Credential not found: {0}")]
    NotFound(CredentialId),
}

impl From<rusqlite::Error> for VaultError {
    fn from(err: rusqlite::Error) -> Self {
        VaultError::Store(StoreError::Database(err))
    }
}

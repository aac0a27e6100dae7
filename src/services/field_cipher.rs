//! Field Cipher for SecurePass.
//!
//! Seals one password at a time with AES-256-GCM under the vault key. Every
//! write draws a fresh 96-bit IV; the ciphertext (tag appended) and the IV are
//! stored as separate base64 text columns.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::services::key_manager::{KeyHandle, KeyManager};
use crate::types::credential::EncryptedField;
use crate::types::errors::CryptoError;

/// AES-256-GCM nonce/IV length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Trait defining single-field encryption for stored passwords.
pub trait FieldCipherTrait {
    /// Encrypts `plaintext` under the vault key with a fresh random IV.
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedField, CryptoError>;

    /// Decrypts a base64 ciphertext with the base64 IV it was sealed under.
    ///
    /// Fails with [`CryptoError::IntegrityFailure`] if the tag does not verify.
    fn decrypt(&self, ciphertext: &str, iv: &str) -> Result<Zeroizing<String>, CryptoError>;

    /// Decrypts a pair produced by [`FieldCipherTrait::encrypt`].
    fn decrypt_field(&self, field: &EncryptedField) -> Result<Zeroizing<String>, CryptoError> {
        self.decrypt(field.ciphertext(), field.iv())
    }
}

/// A nonce sequence that uses a single nonce value.
/// Used for one-shot encryption/decryption operations.
struct SingleNonce {
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_LENGTH]) -> Self {
        Self {
            nonce: Some(nonce_bytes),
        }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// AES-256-GCM field cipher keyed by the [`KeyManager`]'s vault key.
///
/// The stored ciphertext is `ciphertext || tag`, base64-encoded; the IV is
/// stored separately, also base64. Nothing here is logged.
pub struct FieldCipher {
    keys: Arc<KeyManager>,
    rng: SystemRandom,
}

impl FieldCipher {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self {
            keys,
            rng: SystemRandom::new(),
        }
    }

    pub fn key_manager(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    fn unbound_key(key: &KeyHandle) -> Result<UnboundKey, ring::error::Unspecified> {
        UnboundKey::new(&AES_256_GCM, key.as_bytes())
    }

    fn decode(field: &'static str, value: &str) -> Result<Vec<u8>, CryptoError> {
        BASE64
            .decode(value.trim())
            .map_err(|e| CryptoError::MalformedField {
                field,
                reason: e.to_string(),
            })
    }
}

impl FieldCipherTrait for FieldCipher {
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedField, CryptoError> {
        let key = self.keys.get_or_create_key()?;

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate IV".to_string()))?;

        let unbound_key = Self::unbound_key(&key)
            .map_err(|_| CryptoError::Encryption("Failed to create encryption key".to_string()))?;
        let mut sealing_key = aead::SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut in_out = Zeroizing::new(plaintext.as_bytes().to_vec());
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut *in_out)
            .map_err(|_| CryptoError::Encryption("Encryption operation failed".to_string()))?;

        Ok(EncryptedField::new(
            BASE64.encode(in_out.as_slice()),
            BASE64.encode(nonce_bytes),
        ))
    }

    fn decrypt(&self, ciphertext: &str, iv: &str) -> Result<Zeroizing<String>, CryptoError> {
        let iv_bytes = Self::decode("iv", iv)?;
        if iv_bytes.len() != NONCE_LENGTH {
            return Err(CryptoError::InvalidIvLength {
                expected: NONCE_LENGTH,
                got: iv_bytes.len(),
            });
        }
        let mut in_out = Zeroizing::new(Self::decode("ciphertext", ciphertext)?);
        if in_out.len() < TAG_LENGTH {
            return Err(CryptoError::MalformedField {
                field: "ciphertext",
                reason: format!("shorter than the {} byte authentication tag", TAG_LENGTH),
            });
        }

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        nonce_bytes.copy_from_slice(&iv_bytes);

        let key = self.keys.get_or_create_key()?;
        let unbound_key = Self::unbound_key(&key).map_err(|_| CryptoError::IntegrityFailure)?;
        let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out[..])
            .map_err(|_| CryptoError::IntegrityFailure)?;

        let text = std::str::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

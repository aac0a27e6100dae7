//! Key Manager for SecurePass.
//!
//! Owns the single vault key. The key lives in a [`SecureKeyFacility`]
//! (the OS keychain in production) under a fixed alias; application storage
//! only ever refers to the alias.
//!
//! Creation is lazy and idempotent: the first caller that finds no key
//! generates 256 random bits and asks the facility to store them *if absent*,
//! then uses whatever the facility holds afterwards. Convergence under
//! concurrent first use therefore rests on the facility's create-if-absent
//! atomicity, not on an application lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::types::errors::KeyStoreError;

/// Alias the vault key is stored under unless configured otherwise.
pub const DEFAULT_KEY_ALIAS: &str = "SECURE_PASS_KEY";

/// AES-256 key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// Platform storage for secret key material, addressed by alias.
pub trait SecureKeyFacility: Send + Sync {
    /// Returns the material stored under `alias`, or `None` if nothing is stored.
    fn load(&self, alias: &str) -> Result<Option<Zeroizing<Vec<u8>>>, KeyStoreError>;

    /// Stores `material` under `alias` unless an entry already exists, and
    /// returns the material the facility holds for `alias` afterwards.
    fn store_if_absent(
        &self,
        alias: &str,
        material: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KeyStoreError>;
}

/// Key facility backed by the OS keychain (Keychain, Credential Manager, Secret Service).
///
/// Keychain entries are UTF-8, so key bytes are stored base64-encoded.
/// Keychains offer no compare-and-set; `store_if_absent` checks, writes, then
/// re-reads so that the value returned is the one that won.
pub struct KeyringFacility {
    service: String,
}

impl KeyringFacility {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, alias: &str) -> Result<keyring::Entry, KeyStoreError> {
        keyring::Entry::new(&self.service, alias)
            .map_err(|e| KeyStoreError::Unavailable(format!("Failed to open keyring entry: {}", e)))
    }
}

impl SecureKeyFacility for KeyringFacility {
    fn load(&self, alias: &str) -> Result<Option<Zeroizing<Vec<u8>>>, KeyStoreError> {
        let entry = self.entry(alias)?;
        let encoded = match entry.get_password() {
            Ok(value) => Zeroizing::new(value),
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(KeyStoreError::Unavailable(e.to_string())),
        };
        let decoded = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| KeyStoreError::Corrupted(format!("keychain entry is not base64: {}", e)))?;
        Ok(Some(Zeroizing::new(decoded)))
    }

    fn store_if_absent(
        &self,
        alias: &str,
        material: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KeyStoreError> {
        if let Some(existing) = self.load(alias)? {
            return Ok(existing);
        }
        let encoded = Zeroizing::new(BASE64.encode(material));
        self.entry(alias)?
            .set_password(&encoded)
            .map_err(|e| KeyStoreError::Unavailable(format!("Failed to store key: {}", e)))?;
        self.load(alias)?.ok_or_else(|| {
            KeyStoreError::Unavailable("key vanished right after being stored".to_string())
        })
    }
}

/// Process-local key facility. Keys die with the process; used for tests and
/// throwaway sessions.
#[derive(Default)]
pub struct InMemoryKeyFacility {
    keys: Mutex<HashMap<String, Zeroizing<Vec<u8>>>>,
}

impl InMemoryKeyFacility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aliases currently holding a key.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Zeroizing<Vec<u8>>>> {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SecureKeyFacility for InMemoryKeyFacility {
    fn load(&self, alias: &str) -> Result<Option<Zeroizing<Vec<u8>>>, KeyStoreError> {
        Ok(self.lock().get(alias).cloned())
    }

    fn store_if_absent(
        &self,
        alias: &str,
        material: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KeyStoreError> {
        let mut keys = self.lock();
        let stored = keys
            .entry(alias.to_string())
            .or_insert_with(|| Zeroizing::new(material.to_vec()));
        Ok(stored.clone())
    }
}

/// Handle to the vault key. Wiped on drop, never serialized.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyHandle {
    #[zeroize(skip)]
    alias: String,
    key: [u8; KEY_LENGTH],
}

impl KeyHandle {
    fn from_material(alias: &str, material: &[u8]) -> Result<Self, KeyStoreError> {
        if material.len() != KEY_LENGTH {
            return Err(KeyStoreError::InvalidKeyLength {
                expected: KEY_LENGTH,
                got: material.len(),
            });
        }
        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(material);
        Ok(Self {
            alias: alias.to_string(),
            key,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("alias", &self.alias)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Creates or retrieves the vault key under a fixed alias.
pub struct KeyManager {
    facility: Arc<dyn SecureKeyFacility>,
    alias: String,
    rng: SystemRandom,
    cached: Mutex<Option<Arc<KeyHandle>>>,
}

impl KeyManager {
    pub fn new(facility: Arc<dyn SecureKeyFacility>, alias: impl Into<String>) -> Self {
        Self {
            facility,
            alias: alias.into(),
            rng: SystemRandom::new(),
            cached: Mutex::new(None),
        }
    }

    /// A manager using [`DEFAULT_KEY_ALIAS`].
    pub fn with_default_alias(facility: Arc<dyn SecureKeyFacility>) -> Self {
        Self::new(facility, DEFAULT_KEY_ALIAS)
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Returns the vault key, generating and storing it on first use.
    ///
    /// # Errors
    /// `KeyStoreError` if the facility is unreachable, holds malformed
    /// material, or the random source fails.
    pub fn get_or_create_key(&self) -> Result<Arc<KeyHandle>, KeyStoreError> {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = cached.as_ref() {
            return Ok(Arc::clone(handle));
        }

        let handle = match self.facility.load(&self.alias)? {
            Some(material) => {
                debug!(alias = %self.alias, "loaded vault key from secure facility");
                KeyHandle::from_material(&self.alias, &material)?
            }
            None => {
                let mut fresh = Zeroizing::new([0u8; KEY_LENGTH]);
                self.rng.fill(&mut fresh[..]).map_err(|_| {
                    KeyStoreError::RandomGeneration("Failed to generate vault key".to_string())
                })?;
                let stored = self.facility.store_if_absent(&self.alias, &fresh[..])?;
                info!(alias = %self.alias, "created vault key in secure facility");
                KeyHandle::from_material(&self.alias, &stored)?
            }
        };

        let handle = Arc::new(handle);
        *cached = Some(Arc::clone(&handle));
        Ok(handle)
    }
}

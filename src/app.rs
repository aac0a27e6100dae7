//! App Core for SecurePass.
//!
//! Central struct holding the single database handle and every service built
//! on it, and managing the session lifecycle. Vault operations are reached
//! through [`App::vault`], which refuses access until the biometric gate opens.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::database::connection::Database;
use crate::services::biometric_gate::{Authenticator, BiometricGate, PlatformAuthenticator};
use crate::services::credential_store::CredentialStore;
use crate::services::field_cipher::FieldCipher;
use crate::services::key_manager::{KeyManager, KeyringFacility, SecureKeyFacility};
use crate::services::vault_service::VaultService;
use crate::types::auth::{BiometricResult, GateState, PromptInfo};
use crate::types::errors::{AuthError, VaultError};
use crate::types::settings::VaultSettings;

/// Central application struct holding all services.
pub struct App {
    pub db: Arc<Database>,
    pub key_manager: Arc<KeyManager>,
    store: Arc<CredentialStore>,
    gate: BiometricGate,
}

impl App {
    /// Opens the database at `db_path` and wires the services around it.
    ///
    /// The key facility and authenticator are injected so hosts and tests can
    /// supply their own.
    pub fn open<P: AsRef<Path>>(
        db_path: P,
        settings: &VaultSettings,
        facility: Arc<dyn SecureKeyFacility>,
        authenticator: Box<dyn Authenticator>,
    ) -> Result<Self, VaultError> {
        let db = Arc::new(Database::open(db_path)?);
        Self::with_database(db, settings, facility, authenticator)
    }

    /// Wires the services around an already-open database.
    pub fn with_database(
        db: Arc<Database>,
        settings: &VaultSettings,
        facility: Arc<dyn SecureKeyFacility>,
        authenticator: Box<dyn Authenticator>,
    ) -> Result<Self, VaultError> {
        let security = &settings.security;
        let key_manager = Arc::new(KeyManager::new(facility, security.key_alias.clone()));
        let cipher = FieldCipher::new(Arc::clone(&key_manager));
        let store = Arc::new(CredentialStore::new(Arc::clone(&db), cipher)?);
        let gate = BiometricGate::new(authenticator, PromptInfo::from(security))
            .allow_without_biometric(security.allow_without_biometric);

        Ok(Self {
            db,
            key_manager,
            store,
            gate,
        })
    }

    /// Production wiring: OS keychain facility and the platform authenticator.
    pub fn from_settings<P: AsRef<Path>>(
        db_path: P,
        settings: &VaultSettings,
    ) -> Result<Self, VaultError> {
        let facility = Arc::new(KeyringFacility::new(settings.security.keychain_service.clone()));
        Self::open(db_path, settings, facility, Box::new(PlatformAuthenticator))
    }

    /// Startup sequence: prompt once for biometric authentication.
    ///
    /// A rejected prompt leaves the app running with the gate closed so the
    /// caller can offer a retry.
    pub fn startup(&mut self) -> Result<(), AuthError> {
        info!(version = env!("CARGO_PKG_VERSION"), "SecurePass starting");
        self.gate.authenticate()
    }

    /// Re-runs the biometric prompt (the retry affordance).
    pub fn authenticate(&mut self) -> Result<(), AuthError> {
        self.gate.authenticate()
    }

    /// Applies the outcome of a prompt the host shell showed itself.
    pub fn submit_auth_result(&mut self, result: BiometricResult) -> Result<(), AuthError> {
        self.gate.submit(result)
    }

    pub fn gate_state(&self) -> &GateState {
        self.gate.state()
    }

    pub fn is_unlocked(&self) -> bool {
        self.gate.is_open()
    }

    /// The credential store, once the gate is open.
    pub fn vault(&self) -> Result<&CredentialStore, AuthError> {
        self.gate.require_open()?;
        Ok(self.store.as_ref())
    }

    /// An async handle to the store, once the gate is open.
    pub fn vault_service(&self) -> Result<VaultService, AuthError> {
        self.gate.require_open()?;
        Ok(VaultService::new(Arc::clone(&self.store)))
    }

    /// Shutdown sequence: close the gate.
    pub fn shutdown(&mut self) {
        self.gate.lock();
        info!("SecurePass shut down");
    }

    /// Shuts down and closes the database handle.
    ///
    /// If a [`VaultService`] handed out earlier is still alive the handle
    /// stays open and closes when the last holder drops it.
    pub fn close(mut self) -> Result<(), VaultError> {
        self.shutdown();
        let App { db, key_manager, store, .. } = self;
        drop(store);
        drop(key_manager);
        match Arc::try_unwrap(db) {
            Ok(db) => db.close()?,
            Err(_) => warn!("database still shared at shutdown; closing on last drop"),
        }
        Ok(())
    }
}

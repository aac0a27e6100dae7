// SecurePass services
// Services provide the vault's functionality: keys, field encryption, credential
// storage, the biometric gate, validation and settings.

pub mod biometric_gate;
pub mod credential_store;
pub mod field_cipher;
pub mod key_manager;
pub mod settings_engine;
pub mod validation;
pub mod vault_service;

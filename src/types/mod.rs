// SecurePass shared type definitions
// Each submodule defines types used across the vault.

pub mod auth;
pub mod credential;
pub mod errors;
pub mod settings;

//! SecurePass: a local password vault.
//!
//! Credentials live in a SQLite database with every password sealed by
//! AES-256-GCM under a key held in the OS keychain. Access is gated by a
//! one-per-session biometric check.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;

//! Security tests for SecurePass.
//!
//! Validates that:
//! - list/get responses never carry plaintext, ciphertext or IVs
//! - the database holds no plaintext
//! - tampered or mismatched stored pairs are detected on reveal
//! - a vault opened with a different key cannot read existing records

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rusqlite::params;
use serde_json::json;
use tempfile::TempDir;

use securepass::app::App;
use securepass::database::Database;
use securepass::rpc_handler::handle_method;
use securepass::services::biometric_gate::Authenticator;
use securepass::services::credential_store::{CredentialStore, CredentialStoreTrait};
use securepass::services::field_cipher::FieldCipher;
use securepass::services::key_manager::{InMemoryKeyFacility, KeyManager};
use securepass::types::auth::{BiometricResult, PromptInfo};
use securepass::types::settings::VaultSettings;

const SECRET: &str = "Sup3r-S3cret-Value";

struct AlwaysSucceeds;

impl Authenticator for AlwaysSucceeds {
    fn authenticate(&self, _prompt: &PromptInfo) -> BiometricResult {
        BiometricResult::Success
    }
}

fn setup_app() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("temp dir");
    let db_path = tmp.path().join("sec_test.db");
    let mut app = App::open(
        &db_path,
        &VaultSettings::default(),
        Arc::new(InMemoryKeyFacility::new()),
        Box::new(AlwaysSucceeds),
    )
    .expect("App init");
    app.startup().unwrap();
    (Mutex::new(app), tmp)
}

fn store_with(db: Arc<Database>, facility: Arc<InMemoryKeyFacility>) -> CredentialStore {
    let keys = Arc::new(KeyManager::with_default_alias(facility));
    CredentialStore::new(db, FieldCipher::new(keys)).unwrap()
}

// ═══════════════════════════════════════════════════════════════
// RPC surface: metadata only
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_list_and_get_do_not_leak_secrets() {
    let (app, _tmp) = setup_app();
    let res = handle_method(&app, "credential.add", &json!({
        "account_type": "Bank",
        "username": "me@bank.com",
        "password": SECRET,
    }))
    .unwrap();
    let id = res["id"].as_i64().unwrap();

    let list = handle_method(&app, "credential.list", &json!({})).unwrap().to_string();
    let get = handle_method(&app, "credential.get", &json!({"id": id})).unwrap();
    for rendered in [list, get.to_string()] {
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("encrypted_password"));
        assert!(!rendered.contains("\"iv\""));
    }
    assert!(get.get("password").is_none());
}

// ═══════════════════════════════════════════════════════════════
// Storage: ciphertext only
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_database_contains_no_plaintext() {
    let (app, _tmp) = setup_app();
    handle_method(&app, "credential.add", &json!({
        "account_type": "Bank",
        "username": "me@bank.com",
        "password": SECRET,
    }))
    .unwrap();

    let guard = app.lock().unwrap();
    let conn = guard.db.connection();
    let (ct, iv): (String, String) = conn
        .query_row("SELECT encrypted_password, iv FROM passwords", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert!(!ct.contains(SECRET));
    let decoded = BASE64.decode(&ct).unwrap();
    assert!(!decoded.windows(SECRET.len()).any(|w| w == SECRET.as_bytes()));
    assert_eq!(BASE64.decode(&iv).unwrap().len(), 12);
}

// ═══════════════════════════════════════════════════════════════
// Integrity: tampering and swapped pairs
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_tampered_row_fails_on_reveal() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let store = store_with(db.clone(), Arc::new(InMemoryKeyFacility::new()));
    let id = store.add("Bank", "", "me@bank.com", SECRET).unwrap();

    let ct: String = db
        .connection()
        .query_row("SELECT encrypted_password FROM passwords WHERE id = ?1", params![id], |r| r.get(0))
        .unwrap();
    let mut bytes = BASE64.decode(&ct).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    db.connection()
        .execute(
            "UPDATE passwords SET encrypted_password = ?1 WHERE id = ?2",
            params![BASE64.encode(bytes), id],
        )
        .unwrap();

    let record = store.get(id).unwrap().unwrap();
    let err = store.reveal(&record).unwrap_err();
    assert!(err.is_integrity_failure());
}

#[test]
fn test_swapped_ivs_between_rows_fail() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let store = store_with(db, Arc::new(InMemoryKeyFacility::new()));
    let a = store.get(store.add("A", "", "a@b.com", "password-a").unwrap()).unwrap().unwrap();
    let b = store.get(store.add("B", "", "b@b.com", "password-b").unwrap()).unwrap().unwrap();

    assert!(store.decrypt_password_for(a.encrypted_password(), b.iv()).is_err());
    assert!(store.decrypt_password_for(b.encrypted_password(), a.iv()).is_err());
}

#[test]
fn test_different_key_cannot_read_records() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let writer = store_with(db.clone(), Arc::new(InMemoryKeyFacility::new()));
    let id = writer.add("Bank", "", "me@bank.com", SECRET).unwrap();

    let reader = store_with(db, Arc::new(InMemoryKeyFacility::new()));
    let record = reader.get(id).unwrap().unwrap();
    assert!(reader.reveal(&record).unwrap_err().is_integrity_failure());
}

#[test]
fn test_gate_failure_blocks_reveal() {
    struct Denies(Mutex<VecDeque<BiometricResult>>);
    impl Authenticator for Denies {
        fn authenticate(&self, _prompt: &PromptInfo) -> BiometricResult {
            self.0.lock().unwrap().pop_front().unwrap_or(BiometricResult::Failed)
        }
    }

    let tmp = TempDir::new().unwrap();
    let mut app = App::open(
        tmp.path().join("locked.db"),
        &VaultSettings::default(),
        Arc::new(InMemoryKeyFacility::new()),
        Box::new(Denies(Mutex::new(VecDeque::new()))),
    )
    .unwrap();
    assert!(app.startup().is_err());
    let app = Mutex::new(app);

    let err = handle_method(&app, "credential.reveal", &json!({"id": 1})).unwrap_err();
    assert_eq!(err, "Vault is locked: authenticate first");
}

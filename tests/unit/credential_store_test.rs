//! Unit tests for the Credential Store.
//!
//! Tests add/get/list/update/delete, ordering by last modification, the
//! partial-update rules and password reveal.

use std::sync::Arc;

use tempfile::TempDir;

use securepass::database::Database;
use securepass::services::credential_store::{CredentialStore, CredentialStoreTrait};
use securepass::services::field_cipher::FieldCipher;
use securepass::services::key_manager::{InMemoryKeyFacility, KeyManager};
use securepass::types::credential::UpdateOutcome;

fn setup() -> CredentialStore {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let keys = Arc::new(KeyManager::with_default_alias(Arc::new(InMemoryKeyFacility::new())));
    CredentialStore::new(db, FieldCipher::new(keys)).unwrap()
}

// ─── Add / Get ───

#[test]
fn test_add_then_get() {
    let store = setup();
    let id = store.add("Google", "Personal", "a@b.com", "Passw0rd!").unwrap();
    assert_eq!(id, 1);

    let record = store.get(id).unwrap().unwrap();
    assert_eq!(record.account_type, "Google");
    assert_eq!(record.account_name, "Personal");
    assert_eq!(record.username, "a@b.com");
    assert_eq!(record.created_at, record.updated_at);
    assert_ne!(record.encrypted_password(), "Passw0rd!");
    assert_eq!(store.reveal(&record).unwrap().as_str(), "Passw0rd!");
}

#[test]
fn test_get_missing_is_none() {
    let store = setup();
    assert!(store.get(99).unwrap().is_none());
}

#[test]
fn test_empty_account_name_is_allowed() {
    let store = setup();
    let id = store.add("GitHub", "", "dev@example.com", "longenough").unwrap();
    assert_eq!(store.get(id).unwrap().unwrap().account_name, "");
}

#[test]
fn test_decrypt_password_for_matches_reveal() {
    let store = setup();
    let id = store.add("Google", "", "a@b.com", "Passw0rd!").unwrap();
    let record = store.get(id).unwrap().unwrap();
    let plain = store
        .decrypt_password_for(record.encrypted_password(), record.iv())
        .unwrap();
    assert_eq!(plain.as_str(), "Passw0rd!");
}

// ─── List ordering ───

#[test]
fn test_list_is_most_recent_first() {
    let store = setup();
    let a = store.add("A", "", "a@b.com", "password-a").unwrap();
    let b = store.add("B", "", "b@b.com", "password-b").unwrap();
    let c = store.add("C", "", "c@b.com", "password-c").unwrap();

    let ids: Vec<_> = store.list().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![c, b, a]);

    store.update(a, "A", "", "a@b.com", None).unwrap();
    let ids: Vec<_> = store.list().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![a, c, b]);
}

#[test]
fn test_list_empty_store() {
    assert!(setup().list().unwrap().is_empty());
}

// ─── Update ───

#[test]
fn test_update_labels_keeps_password_pair() {
    let store = setup();
    let id = store.add("Google", "", "a@b.com", "Passw0rd!").unwrap();
    let before = store.get(id).unwrap().unwrap();

    let outcome = store.update(id, "Gmail", "Work", "w@b.com", None).unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated);

    let after = store.get(id).unwrap().unwrap();
    assert_eq!(after.account_type, "Gmail");
    assert_eq!(after.account_name, "Work");
    assert_eq!(after.username, "w@b.com");
    assert_eq!(after.password, before.password);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
}

#[test]
fn test_update_with_blank_password_keeps_pair() {
    let store = setup();
    let id = store.add("Google", "", "a@b.com", "Passw0rd!").unwrap();
    let before = store.get(id).unwrap().unwrap();

    store.update(id, "Google", "", "a@b.com", Some("   ")).unwrap();
    let after = store.get(id).unwrap().unwrap();
    assert_eq!(after.password, before.password);
}

#[test]
fn test_update_with_new_password_rotates_pair() {
    let store = setup();
    let id = store.add("Google", "", "a@b.com", "Passw0rd!").unwrap();
    let before = store.get(id).unwrap().unwrap();

    store.update(id, "Google", "", "a@b.com", Some("N3wPassw0rd")).unwrap();
    let after = store.get(id).unwrap().unwrap();

    assert_ne!(after.iv(), before.iv());
    assert_ne!(after.encrypted_password(), before.encrypted_password());
    assert_eq!(store.reveal(&after).unwrap().as_str(), "N3wPassw0rd");

    // The old IV with the new ciphertext is not a valid pair.
    let err = store
        .decrypt_password_for(after.encrypted_password(), before.iv())
        .unwrap_err();
    assert!(err.is_integrity_failure());
}

#[test]
fn test_update_missing_id_writes_nothing() {
    let store = setup();
    store.add("Google", "", "a@b.com", "Passw0rd!").unwrap();
    let outcome = store.update(42, "X", "", "x@b.com", Some("whatever1")).unwrap();
    assert_eq!(outcome, UpdateOutcome::NotFound);
    assert_eq!(store.list().unwrap().len(), 1);
    assert!(store.get(42).unwrap().is_none());
}

// ─── Delete ───

#[test]
fn test_delete_removes_only_target() {
    let store = setup();
    let a = store.add("A", "", "a@b.com", "password-a").unwrap();
    let b = store.add("B", "", "b@b.com", "password-b").unwrap();

    assert!(store.delete(a).unwrap());
    assert!(store.get(a).unwrap().is_none());
    assert!(store.get(b).unwrap().is_some());
}

#[test]
fn test_delete_missing_is_noop() {
    let store = setup();
    store.add("A", "", "a@b.com", "password-a").unwrap();
    assert!(!store.delete(7).unwrap());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_ids_not_reused_after_delete() {
    let store = setup();
    let a = store.add("A", "", "a@b.com", "password-a").unwrap();
    let b = store.add("B", "", "b@b.com", "password-b").unwrap();
    store.delete(b).unwrap();
    let c = store.add("C", "", "c@b.com", "password-c").unwrap();
    assert!(c > b && b > a);
}

// ─── Persistence ───

#[test]
fn test_records_survive_reopen_with_same_key() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("password_database.db");
    let facility = Arc::new(InMemoryKeyFacility::new());

    let id = {
        let db = Arc::new(Database::open(&path).unwrap());
        let keys = Arc::new(KeyManager::with_default_alias(facility.clone()));
        let store = CredentialStore::new(db, FieldCipher::new(keys)).unwrap();
        store.add("Google", "", "a@b.com", "Passw0rd!").unwrap()
    };

    let db = Arc::new(Database::open(&path).unwrap());
    let keys = Arc::new(KeyManager::with_default_alias(facility));
    let store = CredentialStore::new(db, FieldCipher::new(keys)).unwrap();
    let record = store.get(id).unwrap().unwrap();
    assert_eq!(store.reveal(&record).unwrap().as_str(), "Passw0rd!");

    // Mutations after reopen still move records to the front.
    let second = store.add("B", "", "b@b.com", "password-b").unwrap();
    assert!(store.get(second).unwrap().unwrap().updated_at > record.updated_at);
}

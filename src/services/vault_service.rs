//! Async facade over the credential store.
//!
//! SQLite and the cipher block; interactive callers run on an async runtime.
//! Each call is moved onto tokio's blocking pool and the result handed back.

use std::sync::Arc;

use tokio::task;
use zeroize::Zeroizing;

use crate::services::credential_store::{CredentialStore, CredentialStoreTrait};
use crate::types::credential::{Credential, CredentialId, UpdateOutcome};
use crate::types::errors::StoreError;

/// Cloneable async handle to a shared [`CredentialStore`].
#[derive(Clone)]
pub struct VaultService {
    store: Arc<CredentialStore>,
}

impl VaultService {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&CredentialStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| StoreError::Background(e.to_string()))?
    }

    pub async fn list(&self) -> Result<Vec<Credential>, StoreError> {
        self.run(|store| store.list()).await
    }

    pub async fn get(&self, id: CredentialId) -> Result<Option<Credential>, StoreError> {
        self.run(move |store| store.get(id)).await
    }

    pub async fn add(
        &self,
        account_type: String,
        account_name: String,
        username: String,
        password: Zeroizing<String>,
    ) -> Result<CredentialId, StoreError> {
        self.run(move |store| store.add(&account_type, &account_name, &username, &password))
            .await
    }

    pub async fn update(
        &self,
        id: CredentialId,
        account_type: String,
        account_name: String,
        username: String,
        new_password: Option<Zeroizing<String>>,
    ) -> Result<UpdateOutcome, StoreError> {
        self.run(move |store| {
            store.update(
                id,
                &account_type,
                &account_name,
                &username,
                new_password.as_deref().map(String::as_str),
            )
        })
        .await
    }

    pub async fn delete(&self, id: CredentialId) -> Result<bool, StoreError> {
        self.run(move |store| store.delete(id)).await
    }

    pub async fn reveal(&self, credential: Credential) -> Result<Zeroizing<String>, StoreError> {
        self.run(move |store| store.reveal(&credential)).await
    }
}

//! RPC method handler for the SecurePass JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` validates user input, checks the biometric gate and
//! dispatches to the credential store held by the `App` struct.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::services::credential_store::CredentialStoreTrait;
use crate::services::validation::{validate_edit, validate_new_credential};
use crate::types::auth::BiometricResult;
use crate::types::credential::{
    Credential, CredentialId, EditCredentialForm, NewCredentialForm, UpdateOutcome,
};

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn opt_str_param<'a>(params: &'a Value, name: &str) -> &'a str {
    params.get(name).and_then(|v| v.as_str()).unwrap_or("")
}

fn str_param_or(params: &Value, name: &str, fallback: &str) -> String {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .unwrap_or(fallback)
        .to_string()
}

fn id_param(params: &Value) -> Result<CredentialId, String> {
    params
        .get("id")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| "missing id".to_string())
}

fn not_found(id: CredentialId) -> String {
    format!("credential not found: {}", id)
}

/// JSON view of a credential for list/get: labels and timestamps, never the
/// ciphertext or IV.
pub fn credential_summary(c: &Credential) -> Value {
    json!({
        "id": c.id,
        "account_type": c.account_type,
        "account_name": c.account_name,
        "username": c.username,
        "created_at": c.created_at.timestamp_millis(),
        "updated_at": c.updated_at.timestamp_millis(),
    })
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Biometric gate ───
        "auth.status" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            Ok(json!({"unlocked": a.is_unlocked(), "gate": a.gate_state()}))
        }
        "auth.unlock" => {
            // A host that showed its own prompt reports the outcome in `result`.
            let reported = match params.get("result") {
                Some(v) => Some(
                    serde_json::from_value::<BiometricResult>(v.clone())
                        .map_err(|e| format!("invalid result: {}", e))?,
                ),
                None => None,
            };
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = match reported {
                Some(result) => a.submit_auth_result(result),
                None => a.authenticate(),
            };
            outcome.map_err(|e| e.to_string())?;
            Ok(json!({"unlocked": true}))
        }

        // ─── Credentials ───
        "credential.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let store = a.vault().map_err(|e| e.to_string())?;
            let items = store.list().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = items.iter().map(credential_summary).collect();
            Ok(json!(arr))
        }
        "credential.get" => {
            let id = id_param(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let store = a.vault().map_err(|e| e.to_string())?;
            let found = store.get(id).map_err(|e| e.to_string())?;
            Ok(found.as_ref().map(credential_summary).unwrap_or(Value::Null))
        }
        "credential.add" => {
            let password = str_param(params, "password")?;
            let form = NewCredentialForm {
                account_type: opt_str_param(params, "account_type").to_string(),
                account_name: opt_str_param(params, "account_name").to_string(),
                username: opt_str_param(params, "username").to_string(),
                password: password.to_string(),
                password_confirm: params
                    .get("password_confirm")
                    .and_then(|v| v.as_str())
                    .unwrap_or(password)
                    .to_string(),
            };
            validate_new_credential(&form).map_err(|e| e.to_string())?;

            let a = app.lock().map_err(|e| e.to_string())?;
            let store = a.vault().map_err(|e| e.to_string())?;
            let id = store
                .add(&form.account_type, &form.account_name, &form.username, &form.password)
                .map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }
        "credential.update" => {
            let id = id_param(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let store = a.vault().map_err(|e| e.to_string())?;
            let existing = store
                .get(id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| not_found(id))?;

            // Labels left out of `params` keep their stored value.
            let new_password = opt_str_param(params, "new_password");
            let form = EditCredentialForm {
                account_type: str_param_or(params, "account_type", &existing.account_type),
                account_name: str_param_or(params, "account_name", &existing.account_name),
                username: str_param_or(params, "username", &existing.username),
                new_password: new_password.to_string(),
                password_confirm: params
                    .get("password_confirm")
                    .and_then(|v| v.as_str())
                    .unwrap_or(new_password)
                    .to_string(),
            };
            validate_edit(&form, &existing.username).map_err(|e| e.to_string())?;

            let outcome = store
                .update(
                    id,
                    &form.account_type,
                    &form.account_name,
                    &form.username,
                    form.replacement_password(),
                )
                .map_err(|e| e.to_string())?;
            match outcome {
                UpdateOutcome::Updated => Ok(json!({"id": id, "updated": true})),
                UpdateOutcome::NotFound => Err(not_found(id)),
            }
        }
        "credential.delete" => {
            let id = id_param(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let store = a.vault().map_err(|e| e.to_string())?;
            let deleted = store.delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"deleted": deleted}))
        }
        "credential.reveal" => {
            let id = id_param(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let store = a.vault().map_err(|e| e.to_string())?;
            let credential = store
                .get(id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| not_found(id))?;
            let password = store.reveal(&credential).map_err(|e| e.to_string())?;
            Ok(json!({"id": id, "password": password.as_str()}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

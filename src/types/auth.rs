use serde::{Deserialize, Serialize};

use super::settings::SecuritySettings;

/// Result of a biometric prompt.
///
/// In JSON: `"success"`, `"failed"`, ... or `{"error": "message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricResult {
    /// User successfully authenticated
    Success,
    /// The sample was read but did not match
    Failed,
    /// User dismissed the prompt
    Cancelled,
    /// Biometric hardware not available
    NotAvailable,
    /// Hardware present, nothing enrolled
    NotEnrolled,
    /// The prompt reported an error
    Error(String),
}

/// Texts shown by the host's biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptInfo {
    pub title: String,
    pub subtitle: String,
    pub negative_button_text: String,
    pub confirmation_required: bool,
}

impl Default for PromptInfo {
    fn default() -> Self {
        Self::from(&SecuritySettings::default())
    }
}

impl From<&SecuritySettings> for PromptInfo {
    fn from(settings: &SecuritySettings) -> Self {
        Self {
            title: settings.prompt_title.clone(),
            subtitle: settings.prompt_subtitle.clone(),
            negative_button_text: settings.prompt_negative_button.clone(),
            confirmation_required: false,
        }
    }
}

/// Session state of the biometric gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum GateState {
    /// Not yet authenticated this session.
    Locked,
    /// The last attempt failed; the message is shown next to the retry action.
    Failed(String),
    /// Authenticated; vault operations are reachable until shutdown.
    Unlocked,
}

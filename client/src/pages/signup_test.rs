use super::*;

#[test]
fn validate_signup_input_trims_text_fields() {
    let registration = validate_signup_input(" ada ", " Ada Lovelace ", " ada@example.com ", "hunter22").unwrap();
    assert_eq!(registration.username, "ada");
    assert_eq!(registration.full_name, "Ada Lovelace");
    assert_eq!(registration.email, "ada@example.com");
    assert_eq!(registration.password, "hunter22");
}

#[test]
fn validate_signup_input_requires_every_field() {
    assert_eq!(validate_signup_input("", "Ada", "a@b.com", "hunter22"), Err("Fill in every field."));
    assert_eq!(validate_signup_input("ada", "  ", "a@b.com", "hunter22"), Err("Fill in every field."));
}

#[test]
fn validate_signup_input_checks_email_shape() {
    assert_eq!(
        validate_signup_input("ada", "Ada", "not-an-email", "hunter22"),
        Err("Enter a valid email address.")
    );
}

#[test]
fn validate_signup_input_enforces_password_length() {
    assert_eq!(
        validate_signup_input("ada", "Ada", "a@b.com", "12345"),
        Err("Password must be at least 6 characters.")
    );
    assert!(validate_signup_input("ada", "Ada", "a@b.com", "123456").is_ok());
}

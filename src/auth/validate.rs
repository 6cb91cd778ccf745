use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

fn is_alphanumeric(value: &str) -> bool {
    lazy_static! {
        static ref ALNUM_RE: Regex = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
    }
    ALNUM_RE.is_match(value)
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Username rule for registration: alphanumeric, 5-30 characters.
pub fn new_username(username: &str) -> Result<(), ApiError> {
    if username.len() < 5 || username.len() > 30 || !is_alphanumeric(username) {
        return Err(ApiError::Validation(
            "username must be 5-30 alphanumeric characters".into(),
        ));
    }
    Ok(())
}

/// Username rule for login: alphanumeric, 3-30 characters.
pub fn login_username(username: &str) -> Result<(), ApiError> {
    if username.len() < 3 || username.len() > 30 || !is_alphanumeric(username) {
        return Err(ApiError::Validation(
            "username must be 3-30 alphanumeric characters".into(),
        ));
    }
    Ok(())
}

/// Password rule for registration and reset: at least 8 characters with
/// upper, lower, digit and special characters.
pub fn new_password(password: &str) -> Result<(), ApiError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());
    if password.len() < 8 || !has_upper || !has_lower || !has_digit || !has_special {
        return Err(ApiError::Validation(
            "password must be at least 8 characters with upper, lower, digit and special characters"
                .into(),
        ));
    }
    Ok(())
}

pub fn non_empty_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::Validation("password must not be empty".into()));
    }
    Ok(())
}

pub fn email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_username_bounds() {
        assert!(new_username("alice01").is_ok());
        assert!(new_username("ab1").is_err()); // too short
        assert!(new_username(&"a".repeat(31)).is_err()); // too long
        assert!(new_username(&"a".repeat(30)).is_ok());
        assert!(new_username("alice 01").is_err()); // whitespace
        assert!(new_username("alice-01").is_err()); // punctuation
        assert!(new_username("").is_err());
    }

    #[test]
    fn login_username_allows_shorter_names() {
        assert!(login_username("bob").is_ok());
        assert!(login_username("ab").is_err());
        assert!(login_username("alice01").is_ok());
    }

    #[test]
    fn new_password_requires_all_classes() {
        assert!(new_password("Abcdef1!").is_ok());
        assert!(new_password("abcdef1!").is_err()); // no upper
        assert!(new_password("ABCDEF1!").is_err()); // no lower
        assert!(new_password("Abcdefg!").is_err()); // no digit
        assert!(new_password("Abcdefg1").is_err()); // no special
        assert!(new_password("Ab1!").is_err()); // too short
    }

    #[test]
    fn non_empty_password_only_rejects_empty() {
        assert!(non_empty_password("x").is_ok());
        assert!(non_empty_password("").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email("a@x.com").is_ok());
        assert!(email("user.name@sub.example.org").is_ok());
        assert!(email("not-an-email").is_err());
        assert!(email("a@b").is_err()); // no dot in domain
        assert!(email("a b@x.com").is_err());
        assert!(email("").is_err());
    }
}

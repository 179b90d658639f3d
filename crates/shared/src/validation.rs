//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Minimum password length for new accounts.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (argon2 has no practical limit, but unbounded
/// input is a denial-of-service vector).
const MAX_PASSWORD_LENGTH: usize = 128;

/// How far into the future a task due date may be set (10 years).
const MAX_DUE_DATE_YEARS: i64 = 10;

/// Validates password strength for registration.
///
/// Requires 8-128 characters with at least one uppercase letter, one
/// lowercase letter, and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        let mut err = ValidationError::new("password_too_short");
        err.message = Some("Password must be at least 8 characters".into());
        return Err(err);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some("Password must be at most 128 characters".into());
        return Err(err);
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        let mut err = ValidationError::new("password_weak");
        err.message = Some(
            "Password must contain an uppercase letter, a lowercase letter, and a digit".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a task due date is not absurdly far in the future.
///
/// Past due dates are allowed (importing overdue tasks is legitimate).
pub fn validate_due_date(due_date: &DateTime<Utc>) -> Result<(), ValidationError> {
    let limit = Utc::now() + chrono::Duration::days(MAX_DUE_DATE_YEARS * 365);
    if *due_date > limit {
        let mut err = ValidationError::new("due_date_too_far");
        err.message = Some("Due date is too far in the future".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_strength_accepts_strong() {
        assert!(validate_password_strength("SecureP4ss").is_ok());
        assert!(validate_password_strength("Aa1aaaaa").is_ok());
    }

    #[test]
    fn test_validate_password_strength_too_short() {
        let err = validate_password_strength("Aa1").unwrap_err();
        assert_eq!(err.code, "password_too_short");
    }

    #[test]
    fn test_validate_password_strength_too_long() {
        let long = format!("Aa1{}", "x".repeat(130));
        let err = validate_password_strength(&long).unwrap_err();
        assert_eq!(err.code, "password_too_long");
    }

    #[test]
    fn test_validate_password_strength_missing_classes() {
        assert_eq!(
            validate_password_strength("alllowercase1").unwrap_err().code,
            "password_weak"
        );
        assert_eq!(
            validate_password_strength("ALLUPPERCASE1").unwrap_err().code,
            "password_weak"
        );
        assert_eq!(
            validate_password_strength("NoDigitsHere").unwrap_err().code,
            "password_weak"
        );
    }

    #[test]
    fn test_validate_due_date() {
        assert!(validate_due_date(&(Utc::now() + chrono::Duration::days(30))).is_ok());
        // Past dates allowed
        assert!(validate_due_date(&(Utc::now() - chrono::Duration::days(30))).is_ok());
        // 20 years out rejected
        let err = validate_due_date(&(Utc::now() + chrono::Duration::days(20 * 365))).unwrap_err();
        assert_eq!(err.code, "due_date_too_far");
    }
}

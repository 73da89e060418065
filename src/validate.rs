use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

/// Request-body validation. Implementations check fields in declaration
/// order and report the first failure as a 400 naming the field.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap();
    static ref TIME_RE: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Canonical form of a client-supplied email address. Every handler that
/// looks up or stores an email goes through this, so the same client string
/// always reaches the same row.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// "HH:MM", zero-padded, 24-hour clock.
pub fn is_valid_time(time: &str) -> bool {
    TIME_RE.is_match(time)
}

pub fn check_email(field: &str, email: &str) -> Result<(), ApiError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::validation(field, "must be a valid email address"))
    }
}

pub fn check_password(field: &str, password: &str) -> Result<(), ApiError> {
    let chars = password.chars().count();
    if chars < 8 {
        return Err(ApiError::validation(field, "must be at least 8 characters"));
    }
    if chars > 48 {
        return Err(ApiError::validation(field, "must be at most 48 characters"));
    }
    Ok(())
}

pub fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), ApiError> {
    if value < min || value > max {
        return Err(ApiError::validation(
            field,
            &format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn time_pattern() {
        assert!(is_valid_time("07:05"));
        assert!(is_valid_time("23:59"));
        assert!(is_valid_time("00:00"));
        assert!(!is_valid_time("7:5"));
        assert!(!is_valid_time("25:00"));
        assert!(!is_valid_time("12:60"));
        assert!(!is_valid_time("12-30"));
    }

    #[test]
    fn password_bounds() {
        assert!(check_password("password", "12345678").is_ok());
        let err = check_password("password", "short").unwrap_err();
        assert_eq!(err.to_string(), "password must be at least 8 characters");
        assert!(check_password("password", &"x".repeat(49)).is_err());
    }

    #[test]
    fn password_length_counts_chars_not_bytes() {
        // 5 characters, 10 bytes: still too short.
        assert!(check_password("password", "ééééé").is_err());
        // 8 characters, 16 bytes: long enough.
        assert!(check_password("password", "éééééééé").is_ok());
        // 48 multibyte characters stay within the maximum.
        assert!(check_password("password", &"é".repeat(48)).is_ok());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("user@example.com"), "user@example.com");
    }

    #[test]
    fn range_names_field() {
        let err = check_range("day", 32, 1, 31).unwrap_err();
        assert_eq!(err.to_string(), "day must be between 1 and 31");
    }
}

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const EMAIL_MAX: usize = 120;
pub const UID_MAX: usize = 20;
pub const NAME_MAX: usize = 120;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims, lowercases and checks an email address.
pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if email.chars().count() > EMAIL_MAX {
        return Err(AppError::Validation(format!(
            "email must be at most {EMAIL_MAX} characters"
        )));
    }
    Ok(email)
}

/// Trims `value` and requires 1..=`max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

//! Field validation evaluated before any state mutation.
//!
//! Rules are data: each endpoint declares a table of (field, message,
//! predicate) entries, and every failing field is reported together in a
//! single response instead of bailing on the first problem.

use crate::error::ApiError;
use serde::Serialize;

/// A single failed field, as reported to clients.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// One declarative check against a request payload.
pub struct Rule<T: ?Sized> {
    pub field: &'static str,
    pub message: &'static str,
    pub check: fn(&T) -> bool,
}

/// Run every rule against the payload, collecting all failures.
pub fn run<T: ?Sized>(input: &T, rules: &[Rule<T>]) -> Result<(), ApiError> {
    let errors: Vec<FieldError> = rules
        .iter()
        .filter(|rule| !(rule.check)(input))
        .map(|rule| FieldError {
            field: rule.field,
            message: rule.message,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// User names are 3-60 characters.
pub fn user_name_ok(name: &str) -> bool {
    let len = name.chars().count();
    (3..=60).contains(&len)
}

/// Store names are 1-60 characters.
pub fn store_name_ok(name: &str) -> bool {
    let len = name.chars().count();
    (1..=60).contains(&len)
}

/// Structural email check: exactly one '@', a non-empty local part, and a
/// dotted domain. No deliverability probing.
pub fn email_ok(email: &str) -> bool {
    if email.is_empty() || email.chars().count() > 254 {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

const PASSWORD_SPECIALS: &str = "!@#$%^&*";

/// Passwords are 8-16 characters with at least one ASCII uppercase letter
/// and one special character from `!@#$%^&*`.
pub fn password_ok(password: &str) -> bool {
    let len = password.chars().count();
    (8..=16).contains(&len)
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

/// Addresses are optional but capped at 400 characters.
pub fn address_ok(address: &Option<String>) -> bool {
    address.as_ref().map_or(true, |a| a.chars().count() <= 400)
}

/// Ratings are integers from 1 to 5.
pub fn rating_ok(value: i64) -> bool {
    (1..=5).contains(&value)
}

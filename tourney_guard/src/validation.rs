//! Registration payload validation.
//!
//! Runs over the JSON object the handler has already parsed; checks mirror
//! the fields the three registration forms collect. Field presence is
//! governed by the per-endpoint required list, format checks apply whenever
//! the field shows up.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::{ENDPOINT_PLAYER, ENDPOINT_SPONSOR, ENDPOINT_TEAM};

/// Maximum accepted length for the `fullName` field.
const MAX_NAME_LEN: usize = 100;

/// Substrings rejected anywhere in a string value, case-insensitively.
/// `"on"` over-matches ordinary words; the filter errs toward rejecting.
static DANGEROUS_SUBSTRINGS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["<", ">", "script", "javascript:", "on"]);

/// Why a payload was rejected. `Display` gives the user-facing message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid phone number format")]
    InvalidPhone,

    #[error("Name too long (max 100 characters)")]
    NameTooLong,

    #[error("Invalid characters detected")]
    DangerousContent,
}

/// Required fields for each registration form; empty for unknown endpoints.
pub fn required_fields(endpoint: &str) -> &'static [&'static str] {
    match endpoint {
        ENDPOINT_PLAYER => &["fullName", "contactNumber", "email", "playingPosition"],
        ENDPOINT_TEAM => &["teamName", "captainName", "captainContact", "captainEmail"],
        ENDPOINT_SPONSOR => &["contactNumber", "email", "companyName", "sponsorshipLevel"],
        _ => &[],
    }
}

/// Validate a parsed registration payload.
///
/// Checks run in order: required fields, email shape, phone shape, name
/// length, dangerous content. The first failure wins.
pub fn validate_payload(
    data: &Map<String, Value>,
    required: &[&str],
) -> Result<(), ValidationError> {
    for &field in required {
        match data.get(field).and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => {}
            _ => return Err(ValidationError::MissingField(field.to_string())),
        }
    }

    if let Some(email) = data.get("email").and_then(Value::as_str) {
        if !is_valid_email(email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
    }

    if let Some(phone) = data.get("contactNumber").and_then(Value::as_str) {
        if !is_valid_phone(phone.trim()) {
            return Err(ValidationError::InvalidPhone);
        }
    }

    if let Some(name) = data.get("fullName").and_then(Value::as_str) {
        if name.len() > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong);
        }
    }

    for value in data.values() {
        if let Some(text) = value.as_str() {
            let lowered = text.to_lowercase();
            if DANGEROUS_SUBSTRINGS
                .iter()
                .any(|needle| lowered.contains(needle))
            {
                return Err(ValidationError::DangerousContent);
            }
        }
    }

    Ok(())
}

/// Email shape check: dotted local part, one `@`, dotted domain ending in an
/// alphabetic TLD of at least two characters.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c))
    {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Phone shape check: 10 to 15 characters of digits, spaces, `+`, `-`,
/// `(`, `)`.
fn is_valid_phone(phone: &str) -> bool {
    (10..=15).contains(&phone.len())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || " +-()".contains(c))
}

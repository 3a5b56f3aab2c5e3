//! Email normalization

use once_cell::sync::Lazy;
use regex::Regex;

use crate::validation::ValidationError;

/// Local part of printable ASCII specials, then dot-separated domain labels
/// that are alphanumeric with internal hyphens (max 63 chars each).
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("invalid email regex")
});

/// Trim, lowercase and check an address.
///
/// # Example
/// ```
/// use devevent_core::email::normalize_email;
///
/// assert_eq!(normalize_email("  User@Example.COM ").unwrap(), "user@example.com");
/// assert!(normalize_email("not-an-email").is_err());
/// ```
pub fn normalize_email(input: &str) -> Result<String, ValidationError> {
    let email = input.trim().to_lowercase();

    if email.is_empty() {
        return Err(ValidationError::Required { field: "email" });
    }

    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "please provide a valid email address",
        });
    }

    Ok(email)
}

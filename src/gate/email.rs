//! Email normalization and shape validation.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_SHAPE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Normalize an email for lookup/comparison.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email shape check: `local@domain.tld`, no whitespace.
///
/// Intentionally permissive; this is a gate on obvious junk, not RFC 5321.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_SHAPE.as_ref().is_some_and(|regex| regex.is_match(email))
}

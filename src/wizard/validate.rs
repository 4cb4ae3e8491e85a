//! Account field validators.
//!
//! Pragmatic shape checks, not RFC-complete parsing: the goal is to catch
//! obvious typos before the simulated verification flow starts.

use std::sync::LazyLock;

use regex::Regex;

use crate::wizard::model::{AccountDraft, FieldError};
use crate::wizard::verify::VerifyPhase;

/// One-or-more non-whitespace-non-`@`, `@`, same, `.`, same.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Optional leading `+`, one digit, then 7+ digits/spaces/hyphens/parens.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d[\d\s\-()]{7,}$").unwrap());

/// Loose email shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Loose international phone shape check.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

/// Validate the full account submission.
///
/// Returns the field-level errors; submission proceeds only when the list is
/// empty. Both verification channels must have reached `Verified`.
pub fn validate_account(
    account: &AccountDraft,
    email_phase: VerifyPhase,
    phone_phase: VerifyPhase,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if account.full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "Name is required"));
    }

    if account.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(&account.email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }

    if account.phone.trim().is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required"));
    } else if !is_valid_phone(&account.phone) {
        errors.push(FieldError::new("phone", "Enter a valid phone number"));
    }

    if email_phase != VerifyPhase::Verified {
        errors.push(FieldError::new("email_verify", "Please verify your email"));
    }
    if phone_phase != VerifyPhase::Verified {
        errors.push(FieldError::new(
            "phone_verify",
            "Please verify your phone number",
        ));
    }

    errors
}

use std::sync::OnceLock;

use regex::Regex;

use super::domain::PersonalInfo;

/// Inline, field-scoped validation failure. Recoverable by re-input; the
/// form stays interactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern compiles")
    })
}

fn all_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|byte| byte.is_ascii_digit())
}

/// Validate the personal-info section of the registration form.
///
/// Every failure is collected so the caller can surface all inline errors
/// at once rather than stopping at the first field.
pub fn validate_personal_info(info: &PersonalInfo) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if info.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if info.father_name.trim().is_empty() {
        errors.push(FieldError::new("father_name", "Father's name is required"));
    }
    if info.mother_name.trim().is_empty() {
        errors.push(FieldError::new("mother_name", "Mother's name is required"));
    }
    if info.address.trim().is_empty() {
        errors.push(FieldError::new("address", "Address is required"));
    }

    if !email_pattern().is_match(info.email.trim()) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
    if !all_digits(&info.mobile, 10) {
        errors.push(FieldError::new("mobile", "Mobile number must be 10 digits"));
    }
    if !all_digits(&info.aadhaar_number, 12) {
        errors.push(FieldError::new(
            "aadhaar_number",
            "Aadhaar number must be 12 digits",
        ));
    }

    if info.selected_posts.is_empty() {
        errors.push(FieldError::new(
            "selected_posts",
            "Select at least one post preference",
        ));
    }

    // District preferences invalid for the chosen union are not an input
    // error; the store drops them on merge (union-switch invariant).

    errors
}

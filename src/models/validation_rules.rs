use std::borrow::Cow;
use std::collections::HashMap;

use regex::Regex;
use validator::{ValidationError, ValidationErrors};

pub const CONTACT_MESSAGE_MIN_LEN: usize = 10;
pub const CONTACT_MESSAGE_MAX_LEN: usize = 5000;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError {
        code: Cow::from(code),
        message: Some(Cow::from(message)),
        params: HashMap::new(),
    }
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref SLUG_VALIDATION_RE: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
    }

    if slug.len() > 100 {
        Err(error("slug", "Slug must be at most 100 characters"))
    } else if SLUG_VALIDATION_RE.is_match(slug) {
        Ok(())
    } else {
        Err(error("slug", "Slug may contain lowercase letters, digits and single dashes only"))
    }
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref PHONE_VALIDATION_RE: Regex = Regex::new(r"^\+?[0-9 ()/-]{6,30}$").unwrap();
    }

    if PHONE_VALIDATION_RE.is_match(phone) {
        Ok(())
    } else {
        Err(error("phone", "Incorrect phone format"))
    }
}

pub fn validate_setting_key(key: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref SETTING_KEY_RE: Regex = Regex::new(r"^[a-z0-9_.-]+$").unwrap();
    }

    if SETTING_KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(error("setting_key", "Key may contain lowercase letters, digits, dots, dashes and underscores"))
    }
}

pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(error("blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}

/// Counts characters, not bytes, so umlauts are one character each.
pub fn validate_contact_message(message: &str) -> Result<(), ValidationError> {
    let len = message.trim().chars().count();
    if len < CONTACT_MESSAGE_MIN_LEN {
        Err(error("message_too_short", "message too short"))
    } else if len > CONTACT_MESSAGE_MAX_LEN {
        Err(error("message_too_long", "message too long"))
    } else {
        Ok(())
    }
}

/// Cross-field check, lower bound must not exceed the upper one.
pub fn validate_price_range(price_min: Option<i32>, price_max: Option<i32>) -> Result<(), ValidationErrors> {
    match (price_min, price_max) {
        (Some(min), Some(max)) if min > max => Err(validation_errors!({
            "price_max": ["price_range" => "Maximal price must not be less than minimal price"]
        })),
        (None, Some(_)) => Err(validation_errors!({
            "price_min": ["price_range" => "Minimal price is required when maximal price is set"]
        })),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub mod tests {
    use serde_json;

    use super::*;

    /// Names of the fields that failed, sorted
    pub fn error_fields(errors: &ValidationErrors) -> Vec<String> {
        let mut fields = serde_json::to_value(errors)
            .ok()
            .and_then(|value| value.as_object().map(|map| map.keys().cloned().collect::<Vec<String>>()))
            .unwrap_or_default();
        fields.sort();
        fields
    }

    #[test]
    fn test_slug() {
        assert!(validate_slug("notebook").is_ok());
        assert!(validate_slug("iphone-15-pro").is_ok());
        assert!(validate_slug("Notebook").is_err());
        assert!(validate_slug("double--dash").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("").is_err());
        assert!(validate_slug(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_contact_message_length() {
        let err = validate_contact_message("123456789").unwrap_err();
        assert_eq!(err.code, "message_too_short");
        assert_eq!(err.message.unwrap(), "message too short");
        assert!(validate_contact_message("1234567890").is_ok());
        assert!(validate_contact_message("Größe ändern").is_ok());
        assert!(validate_contact_message(&"x".repeat(5001)).is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+49 30 1234567").is_ok());
        assert!(validate_phone("030/123-456").is_ok());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_price_range() {
        assert!(validate_price_range(Some(59), Some(249)).is_ok());
        assert!(validate_price_range(Some(59), None).is_ok());
        assert!(validate_price_range(None, None).is_ok());
        assert!(validate_price_range(Some(300), Some(249)).is_err());
        assert!(validate_price_range(None, Some(249)).is_err());
    }
}

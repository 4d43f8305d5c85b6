// Settings validation

use crate::{ConfigError, Result};
use vellum_sanitizer::scrubber::REMOVED_ELEMENTS;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Validation rules for settings fields
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate a tag or attribute name: an ASCII letter followed by ASCII
    /// letters, digits, `-` or `_`
    pub fn is_name(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        let mut bytes = value.bytes();
        let starts_with_letter = bytes.next().is_some_and(|b| b.is_ascii_alphabetic());
        if !starts_with_letter || !bytes.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an ASCII name, got {:?}",
                field, value
            )));
        }
        Ok(())
    }

    /// Reject event-handler attribute names
    pub fn not_event_handler(attribute: &str, field: &str) -> Result<()> {
        if attribute.len() >= 2 && attribute.as_bytes()[..2].eq_ignore_ascii_case(b"on") {
            return Err(ConfigError::ValidationError(format!(
                "{} may not allow event handler {:?}",
                field, attribute
            )));
        }
        Ok(())
    }

    /// Reject elements that are always removed with their content
    pub fn not_dangerous_tag(tag: &str, field: &str) -> Result<()> {
        if REMOVED_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "{} may not allow dangerous element <{}>",
                field, tag
            )));
        }
        Ok(())
    }

    /// Validate that a limit is non-zero
    pub fn non_zero(value: usize, field: &str) -> Result<()> {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be greater than zero",
                field
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
    }

    #[test]
    fn test_name_validation() {
        assert!(ConfigValidator::is_name("h2", "field").is_ok());
        assert!(ConfigValidator::is_name("data-id", "field").is_ok());
        assert!(ConfigValidator::is_name("", "field").is_err());
        assert!(ConfigValidator::is_name("2col", "field").is_err());
        assert!(ConfigValidator::is_name("a\"b", "field").is_err());
        assert!(ConfigValidator::is_name("x y", "field").is_err());
    }

    #[test]
    fn test_event_handler_validation() {
        assert!(ConfigValidator::not_event_handler("title", "field").is_ok());
        assert!(ConfigValidator::not_event_handler("OnClick", "field").is_err());
    }

    #[test]
    fn test_dangerous_tag_validation() {
        assert!(ConfigValidator::not_dangerous_tag("p", "field").is_ok());
        assert!(ConfigValidator::not_dangerous_tag("SCRIPT", "field").is_err());
        assert!(ConfigValidator::not_dangerous_tag("svg", "field").is_err());
    }

    #[test]
    fn test_non_zero_validation() {
        assert!(ConfigValidator::non_zero(1, "field").is_ok());
        assert!(ConfigValidator::non_zero(0, "field").is_err());
    }
}

// models/src/validation.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ValidationError, ValidationResult};

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?1?\d{10,13}$").expect("phone regex is valid"));

/// Validates a phone number against the directory format: an optional leading
/// `+`, then 10 to 13 digits.
pub fn validate_phone_number(value: &str) -> ValidationResult<()> {
    if PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhoneNumber(value.to_string()))
    }
}

/// Rounds a value to two decimal places. Used for weight, BMI and the
/// transfer delay in hours.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{round2, validate_phone_number};
    use crate::errors::ValidationError;

    #[test]
    fn should_accept_plain_and_prefixed_numbers() {
        assert!(validate_phone_number("0783378349").is_ok());
        assert!(validate_phone_number("+250783378349").is_ok());
    }

    #[test]
    fn should_reject_short_or_alphabetic_numbers() {
        let err = validate_phone_number("12345").unwrap_err();
        assert_eq!(err, ValidationError::InvalidPhoneNumber("12345".to_string()));
        assert!(validate_phone_number("not-a-number").is_err());
    }

    #[test]
    fn should_round_to_two_decimals() {
        assert_eq!(round2(1.005), 1.0); // floating representation of 1.005 sits below the midpoint
        assert_eq!(round2(2.675000001), 2.68);
        assert_eq!(round2(3.0), 3.0);
    }
}

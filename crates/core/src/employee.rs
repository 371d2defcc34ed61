//! Employee identifier validation.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;

fn employee_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z0-9][A-Z0-9-]{2,19}$").expect("employee number pattern is valid")
    })
}

/// Employee numbers are 3-20 upper-case alphanumerics or dashes, not
/// starting with a dash (e.g. `EMP-0042`).
pub fn validate_employee_number(value: &str) -> Result<(), CoreError> {
    if employee_number_pattern().is_match(value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid employee number '{value}'. Use 3-20 upper-case letters, digits or dashes"
        )))
    }
}

/// Biometric PINs are the numeric user ids enrolled on the attendance
/// machines (1-9 digits).
pub fn validate_biometric_pin(value: &str) -> Result<(), CoreError> {
    let ok = !value.is_empty() && value.len() <= 9 && value.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid biometric PIN '{value}'. Must be 1-9 digits"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_employee_numbers() {
        assert!(validate_employee_number("EMP-0042").is_ok());
        assert!(validate_employee_number("A12").is_ok());
    }

    #[test]
    fn invalid_employee_numbers() {
        assert!(validate_employee_number("emp-1").is_err());
        assert!(validate_employee_number("-EMP1").is_err());
        assert!(validate_employee_number("AB").is_err());
        assert!(validate_employee_number("A".repeat(21).as_str()).is_err());
    }

    #[test]
    fn biometric_pins() {
        assert!(validate_biometric_pin("1").is_ok());
        assert!(validate_biometric_pin("123456789").is_ok());
        assert!(validate_biometric_pin("").is_err());
        assert!(validate_biometric_pin("1234567890").is_err());
        assert!(validate_biometric_pin("12a").is_err());
    }
}

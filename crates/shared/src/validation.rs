//! Common validation utilities.

use validator::ValidationError;

/// Category name length bounds.
const CATEGORY_NAME_MIN: usize = 3;
const CATEGORY_NAME_MAX: usize = 100;

/// Borrow duration bounds in days.
const BORROW_DURATION_MIN: i32 = 1;
const BORROW_DURATION_MAX: i32 = 365;

/// Validates that an email belongs to the institutional domain.
///
/// The allowed domain is compared case-insensitively against everything after
/// the `@`. Subdomains are not accepted: `user@cs.example.edu` does not match
/// an allowed domain of `example.edu`.
pub fn validate_institutional_email(email: &str, allowed_domain: &str) -> Result<(), ValidationError> {
    let domain = email.rsplit_once('@').map(|(_, d)| d);
    match domain {
        Some(d) if d.eq_ignore_ascii_case(allowed_domain) => Ok(()),
        _ => {
            let mut err = ValidationError::new("email_domain");
            err.message = Some(format!("Email must use the @{} domain", allowed_domain).into());
            Err(err)
        }
    }
}

/// Validates a department code: 2 to 10 uppercase alphanumeric characters.
pub fn validate_department_code(code: &str) -> Result<(), ValidationError> {
    let ok = (2..=10).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("department_code");
        err.message = Some("Department code must be 2-10 uppercase letters or digits".into());
        Err(err)
    }
}

/// Validates a category name (3-100 characters after trimming).
pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().len();
    if (CATEGORY_NAME_MIN..=CATEGORY_NAME_MAX).contains(&len) {
        Ok(())
    } else {
        let mut err = ValidationError::new("category_name");
        err.message = Some("Category name must be between 3 and 100 characters".into());
        Err(err)
    }
}

/// Validates a maximum borrow duration (1-365 days).
pub fn validate_borrow_duration(days: i32) -> Result<(), ValidationError> {
    if (BORROW_DURATION_MIN..=BORROW_DURATION_MAX).contains(&days) {
        Ok(())
    } else {
        let mut err = ValidationError::new("borrow_duration");
        err.message = Some("Borrow duration must be between 1 and 365 days".into());
        Err(err)
    }
}

/// Validates a transfer or stock quantity (must be at least 1).
pub fn validate_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity >= 1 {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity");
        err.message = Some("Quantity must be at least 1".into());
        Err(err)
    }
}

/// Validates that a required free-text field is non-empty after trimming.
pub fn validate_non_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Field must not be empty".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a password meets the minimum strength policy (8+ characters,
/// at least one letter and one digit).
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.len() >= 8;
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message =
            Some("Password must be at least 8 characters with a letter and a digit".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_institutional_email_accepts_exact_domain() {
        assert!(validate_institutional_email("jane@example.edu", "example.edu").is_ok());
        assert!(validate_institutional_email("jane@EXAMPLE.EDU", "example.edu").is_ok());
    }

    #[test]
    fn test_institutional_email_rejects_other_domains() {
        assert!(validate_institutional_email("jane@gmail.com", "example.edu").is_err());
        assert!(validate_institutional_email("jane@cs.example.edu", "example.edu").is_err());
        assert!(validate_institutional_email("no-at-sign", "example.edu").is_err());
    }

    #[test]
    fn test_department_code_valid() {
        assert!(validate_department_code("CS").is_ok());
        assert!(validate_department_code("MECH01").is_ok());
        assert!(validate_department_code("A234567890").is_ok());
    }

    #[test]
    fn test_department_code_invalid() {
        assert!(validate_department_code("C").is_err());
        assert!(validate_department_code("cs").is_err());
        assert!(validate_department_code("TOOLONGCODE1").is_err());
        assert!(validate_department_code("CS-1").is_err());
    }

    #[test]
    fn test_category_name_bounds() {
        assert!(validate_category_name("Osc").is_ok());
        assert!(validate_category_name("ab").is_err());
        assert!(validate_category_name(&"x".repeat(100)).is_ok());
        assert!(validate_category_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_borrow_duration_bounds() {
        assert!(validate_borrow_duration(1).is_ok());
        assert!(validate_borrow_duration(365).is_ok());
        assert!(validate_borrow_duration(0).is_err());
        assert!(validate_borrow_duration(366).is_err());
    }

    #[test]
    fn test_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn test_non_empty() {
        assert!(validate_non_empty("reason").is_ok());
        assert!(validate_non_empty("   ").is_err());
        assert!(validate_non_empty("").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("passw0rd").is_ok());
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("allletters").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }
}

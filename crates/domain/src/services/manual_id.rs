//! Human-readable inventory identifiers of the form `CODE-NNN`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MANUAL_ID_REGEX: Regex = Regex::new(r"^([A-Z0-9]{2,10})-(\d{3,})$").unwrap();
}

/// Formats a manual identifier from a department code and sequence number,
/// zero-padding the sequence to three digits.
///
/// Sequences past 999 render with their natural width (`PHY-1000`), and
/// the parser accepts three or more digits, so numbering never caps out.
pub fn format_manual_id(department_code: &str, sequence: i64) -> String {
    format!("{}-{:03}", department_code, sequence)
}

/// Splits a manual identifier into its department code and sequence number.
pub fn parse_manual_id(manual_id: &str) -> Option<(String, i64)> {
    let captures = MANUAL_ID_REGEX.captures(manual_id)?;
    let code = captures.get(1)?.as_str().to_string();
    let sequence = captures.get(2)?.as_str().parse().ok()?;
    Some((code, sequence))
}

pub fn is_valid_manual_id(manual_id: &str) -> bool {
    MANUAL_ID_REGEX.is_match(manual_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_manual_id("PHY", 7), "PHY-007");
        assert_eq!(format_manual_id("PHY", 42), "PHY-042");
        assert_eq!(format_manual_id("PHY", 1234), "PHY-1234");
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(parse_manual_id("CSE-001"), Some(("CSE".to_string(), 1)));
        assert_eq!(parse_manual_id("EE2-150"), Some(("EE2".to_string(), 150)));
        assert_eq!(parse_manual_id("MECH-9999"), Some(("MECH".to_string(), 9999)));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_manual_id("cse-001"), None);
        assert_eq!(parse_manual_id("CSE-01"), None);
        assert_eq!(parse_manual_id("CSE001"), None);
        assert_eq!(parse_manual_id("C-001"), None);
        assert_eq!(parse_manual_id("VERYLONGCODE-001"), None);
        assert_eq!(parse_manual_id(""), None);
    }

    #[test]
    fn test_format_parse_round_trip() {
        let id = format_manual_id("BIO", 305);
        assert!(is_valid_manual_id(&id));
        assert_eq!(parse_manual_id(&id), Some(("BIO".to_string(), 305)));
    }

    #[test]
    fn test_sequence_grows_past_three_digits() {
        let id = format_manual_id("CHEM", 1000);
        assert_eq!(id, "CHEM-1000");
        assert!(is_valid_manual_id(&id));
        assert_eq!(parse_manual_id(&id), Some(("CHEM".to_string(), 1000)));
        assert_eq!(
            parse_manual_id("CHEM-123456"),
            Some(("CHEM".to_string(), 123456))
        );
    }
}

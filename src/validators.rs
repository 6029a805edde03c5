//! Syntax checks for email and phone fields.
//!
//! Both predicates are pure and never fail; they answer "does this look
//! right", not "does this mailbox/number exist".

use std::sync::LazyLock;

use regex::Regex;

/// Shortest accepted phone number, in digits.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Longest accepted phone number, in digits (E.164 maximum).
pub const MAX_PHONE_DIGITS: usize = 15;

// local@domain.tld: no whitespace, exactly one '@', a dot after the domain label
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PHONE_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^[0-9]{{{MIN_PHONE_DIGITS},{MAX_PHONE_DIGITS}}}$")).unwrap()
});

/// Returns true if `s` looks like an email address.
///
/// # Example
/// ```
/// use formstore::validate_email;
///
/// assert!(validate_email("user+tag@example.com"));
/// assert!(!validate_email("@domain.com"));
/// ```
pub fn validate_email(s: &str) -> bool {
    EMAIL_PATTERN.is_match(s)
}

/// Returns true if `s` looks like a phone number.
///
/// An optional leading `+` and any `-` or space separators are ignored; what
/// remains must be 7 to 15 ASCII digits.
///
/// # Example
/// ```
/// use formstore::validate_phone_number;
///
/// assert!(validate_phone_number("+1234567890"));
/// assert!(validate_phone_number("123-456-7890"));
/// assert!(!validate_phone_number("123"));
/// ```
pub fn validate_phone_number(s: &str) -> bool {
    let rest = s.strip_prefix('+').unwrap_or(s);
    let digits: String = rest.chars().filter(|c| *c != '-' && *c != ' ').collect();
    PHONE_DIGITS.is_match(&digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("test@example.com"));
        assert!(validate_email("user.name@domain.co.uk"));
        assert!(validate_email("user+tag@example.com"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!validate_email("invalid-email"));
        assert!(!validate_email("@domain.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@domain"));
        assert!(!validate_email("us er@example.com"));
        assert!(!validate_email("user@@example.com"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_valid_phone_numbers() {
        assert!(validate_phone_number("+1234567890"));
        assert!(validate_phone_number("123-456-7890"));
        assert!(validate_phone_number("1234567890"));
        assert!(validate_phone_number("+44 20 7946 0958"));
        assert!(validate_phone_number("1234567"));
        assert!(validate_phone_number("123456789012345"));
    }

    #[test]
    fn test_invalid_phone_numbers() {
        assert!(!validate_phone_number("123"));
        assert!(!validate_phone_number("abc-def-ghij"));
        assert!(!validate_phone_number(""));
        assert!(!validate_phone_number("+"));
        assert!(!validate_phone_number("1234567890123456"));
        assert!(!validate_phone_number("12+34567890"));
        assert!(!validate_phone_number("(123) 456-7890"));
    }
}

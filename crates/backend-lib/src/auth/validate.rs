// ============================
// crates/backend-lib/src/auth/validate.rs
// ============================
//! Credential validation: email format and password policy.
//!
//! Pure functions, no side effects. Password checks evaluate every rule and
//! report all violations together so callers can show complete guidance.

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Password complexity requirements
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// A violated password rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    TooShort { min_length: usize },
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
}

impl PasswordRule {
    /// Stable identifier for the rule
    pub fn as_str(self) -> &'static str {
        match self {
            PasswordRule::TooShort { .. } => "min_length",
            PasswordRule::MissingUppercase => "uppercase",
            PasswordRule::MissingLowercase => "lowercase",
            PasswordRule::MissingDigit => "digit",
            PasswordRule::MissingSpecial => "special",
        }
    }
}

impl std::fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordRule::TooShort { min_length } => {
                write!(f, "Password must be at least {min_length} characters long")
            },
            PasswordRule::MissingUppercase => {
                write!(f, "Password must contain at least one uppercase letter")
            },
            PasswordRule::MissingLowercase => {
                write!(f, "Password must contain at least one lowercase letter")
            },
            PasswordRule::MissingDigit => write!(f, "Password must contain at least one number"),
            PasswordRule::MissingSpecial => {
                write!(f, "Password must contain at least one special character")
            },
        }
    }
}

/// Normalize an email for storage and comparison: trim and lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Check whether a string is a syntactically valid single email address.
/// No DNS or disposable-domain checks.
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Check a password against the policy, returning every violated rule.
/// The empty list means the password passes.
pub fn validate_password(password: &str, requirements: &PasswordRequirements) -> Vec<PasswordRule> {
    let mut violations = Vec::new();

    if password.chars().count() < requirements.min_length {
        violations.push(PasswordRule::TooShort {
            min_length: requirements.min_length,
        });
    }
    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        violations.push(PasswordRule::MissingUppercase);
    }
    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        violations.push(PasswordRule::MissingLowercase);
    }
    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(PasswordRule::MissingDigit);
    }
    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        violations.push(PasswordRule::MissingSpecial);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com"));
        assert!(validate_email("user.name+tag@example.co.uk"));

        // no @
        assert!(!validate_email("test.example.com"));
        // no domain
        assert!(!validate_email("test@"));
        // no TLD
        assert!(!validate_email("test@example"));
        // empty
        assert!(!validate_email(""));
        // over the SMTP limit
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(!validate_email(&long));
    }

    #[test]
    fn test_validate_password_reports_all_violations() {
        let requirements = PasswordRequirements::default();

        // empty string violates every rule and does not panic
        let violations = validate_password("", &requirements);
        assert_eq!(violations.len(), 5);

        // one violation at a time
        assert_eq!(
            validate_password("abc12345!", &requirements),
            vec![PasswordRule::MissingUppercase]
        );
        assert_eq!(
            validate_password("ABC12345!", &requirements),
            vec![PasswordRule::MissingLowercase]
        );
        assert_eq!(
            validate_password("Abcdefgh!", &requirements),
            vec![PasswordRule::MissingDigit]
        );
        assert_eq!(
            validate_password("Abc123456", &requirements),
            vec![PasswordRule::MissingSpecial]
        );

        // valid password
        assert!(validate_password("Abc12345!", &requirements).is_empty());
    }

    #[test]
    fn test_short_passwords_always_report_length() {
        let requirements = PasswordRequirements::default();
        // regardless of which character classes are present
        for candidate in ["Ab1!", "abcdefg", "A1!", "aB3$xyz"] {
            let violations = validate_password(candidate, &requirements);
            assert!(
                violations.contains(&PasswordRule::TooShort { min_length: 8 }),
                "{candidate} should violate the length rule"
            );
        }
    }

    #[test]
    fn test_custom_requirements() {
        let relaxed = PasswordRequirements {
            min_length: 6,
            require_uppercase: false,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
        };
        assert!(validate_password("abc123", &relaxed).is_empty());
        assert_eq!(
            validate_password("abcdef", &relaxed),
            vec![PasswordRule::MissingDigit]
        );
    }
}

//! Field-level validation shared by admin forms and public lead capture.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_TEXT_LEN: usize = 20_000;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9 ().\-]{7,20}$").expect("phone regex"))
}

fn zip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{5}(?:-\d{4})?$").expect("zip regex"))
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?://[^\s/$.?#][^\s]*|/[^\s]*)$").expect("url regex")
    })
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug regex"))
}

pub fn is_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

pub fn is_phone(value: &str) -> bool {
    let trimmed = value.trim();
    phone_pattern().is_match(trimmed) && trimmed.chars().filter(char::is_ascii_digit).count() >= 7
}

pub fn is_zip(value: &str) -> bool {
    zip_pattern().is_match(value.trim())
}

pub fn is_url(value: &str) -> bool {
    url_pattern().is_match(value.trim())
}

pub fn is_slug(value: &str) -> bool {
    slug_pattern().is_match(value)
}

/// Per-field messages collected while checking a payload. Serialized as `{field: message}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Records the first problem for a field; later messages for the same field are ignored.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Accumulates validation failures so one response can report every invalid field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.add(field, message);
        self
    }

    pub fn required(&mut self, field: &str, value: &str, max_len: usize) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.fail(field, "is required");
        } else if trimmed.chars().count() > max_len {
            self.fail(field, format!("must be at most {max_len} characters"));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max_len: usize) -> &mut Self {
        if let Some(value) = value {
            if value.trim().chars().count() > max_len {
                self.fail(field, format!("must be at most {max_len} characters"));
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        } else if !is_email(value) {
            self.fail(field, "must be a valid email address");
        }
        self
    }

    pub fn optional_email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match non_blank(value) {
            Some(value) => self.email(field, value),
            None => self,
        }
    }

    pub fn optional_phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = non_blank(value) {
            if !is_phone(value) {
                self.fail(field, "must be a valid phone number");
            }
        }
        self
    }

    pub fn optional_zip(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = non_blank(value) {
            if !is_zip(value) {
                self.fail(field, "must be a 5-digit ZIP code");
            }
        }
        self
    }

    pub fn optional_url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = non_blank(value) {
            if !is_url(value) {
                self.fail(field, "must be an http(s) URL or a site path");
            }
        }
        self
    }

    pub fn urls(&mut self, field: &str, values: &[String]) -> &mut Self {
        if values.iter().any(|value| !is_url(value)) {
            self.fail(field, "must contain only http(s) URLs or site paths");
        }
        self
    }

    pub fn slug(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.fail(field, "could not be derived; provide a slug");
        } else if !is_slug(value) {
            self.fail(
                field,
                "may contain only lowercase letters, digits, and single dashes",
            );
        }
        self
    }

    pub fn range<T>(&mut self, field: &str, value: Option<T>, min: T, max: T) -> &mut Self
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if let Some(value) = value {
            if value < min || value > max {
                self.fail(field, format!("must be between {min} and {max}"));
            }
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        let errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Trims optional form input, treating blank strings as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Owned variant of [`non_blank`] used when normalizing payloads before storage.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_requires_at_and_domain_dot() {
        assert!(is_email("buyer@example.com"));
        assert!(is_email("  first.last+tag@sub.example.co  "));
        assert!(!is_email("buyer@example"));
        assert!(!is_email("buyer example@example.com"));
        assert!(!is_email("@example.com"));
    }

    #[test]
    fn phone_requires_seven_digits() {
        assert!(is_phone("(541) 555-0199"));
        assert!(is_phone("+1 541.555.0199"));
        assert!(!is_phone("555-01"));
        assert!(!is_phone("(((---)))"));
        assert!(!is_phone("541-555-CALL"));
    }

    #[test]
    fn zip_accepts_plus_four() {
        assert!(is_zip("97701"));
        assert!(is_zip("97701-1234"));
        assert!(!is_zip("9770"));
        assert!(!is_zip("97701-12"));
    }

    #[test]
    fn url_accepts_site_paths() {
        assert!(is_url("https://example.com/logo.png"));
        assert!(is_url("/uploads/20250101-logo.png"));
        assert!(!is_url("javascript:alert(1)"));
        assert!(!is_url("ftp://example.com/file"));
    }

    #[test]
    fn validator_collects_every_field() {
        let mut validator = Validator::new();
        validator
            .required("name", "  ", MAX_NAME_LEN)
            .email("email", "nope")
            .optional_phone("phone", Some(""))
            .range("bedrooms", Some(40u8), 0, 20);

        let errors = validator.finish().expect_err("invalid payload");
        assert_eq!(errors.get("name"), Some("is required"));
        assert_eq!(errors.get("email"), Some("must be a valid email address"));
        assert!(errors.get("phone").is_none());
        assert_eq!(errors.get("bedrooms"), Some("must be between 0 and 20"));
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = ValidationErrors::default();
        errors.add("slug", "first");
        errors.add("slug", "second");
        assert_eq!(errors.get("slug"), Some("first"));
        assert_eq!(errors.to_string(), "slug: first");
    }
}

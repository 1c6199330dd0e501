//! Form field validators.
//!
//! Every validator except [`Rule::Required`] accepts empty input, so optional
//! fields only get checked once the user types something.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const INVALID_PHONE: &str = "Please enter a valid phone number (e.g., 0545142658)";
pub const SHORT_INDEX_NUMBER: &str = "Index number must be at least 10 characters";
pub const INVALID_INDEX_NUMBER: &str = "Please enter a valid index number";
pub const SHORT_PIN: &str = "PIN must be at least 8 characters";
pub const SHORT_SERIAL: &str = "Serial number must be at least 10 characters";
pub const INVALID_OTP: &str = "Please enter a 6-digit code";

pub fn required(value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some(REQUIRED)
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[0-9]{9}|\+233[0-9]{9})$").expect("valid phone regex"));
static INDEX_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9]{10}[A-Z0-9]*$").expect("valid index regex"));
static OTP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("valid otp regex"));

/// `local@domain.tld` with no whitespace and a dot somewhere after the `@`.
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn email(value: &str) -> Option<&'static str> {
    if value.is_empty() || is_email(value) {
        None
    } else {
        Some(INVALID_EMAIL)
    }
}

/// Ghana numbers: `0` plus nine digits, or `+233` plus nine digits.
pub fn phone(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return None;
    }
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    (!PHONE_RE.is_match(&compact)).then_some(INVALID_PHONE)
}

/// Ten digits, optionally followed by letters or digits.
pub fn index_number(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return None;
    }
    if value.chars().count() < 10 {
        return Some(SHORT_INDEX_NUMBER);
    }
    (!INDEX_NUMBER_RE.is_match(value)).then_some(INVALID_INDEX_NUMBER)
}

pub fn pin(value: &str) -> Option<&'static str> {
    (!value.is_empty() && value.chars().count() < 8).then_some(SHORT_PIN)
}

pub fn serial(value: &str) -> Option<&'static str> {
    (!value.is_empty() && value.chars().count() < 10).then_some(SHORT_SERIAL)
}

pub fn otp(value: &str) -> Option<&'static str> {
    (!value.is_empty() && !OTP_RE.is_match(value)).then_some(INVALID_OTP)
}

pub fn min_length(min: usize, value: &str) -> Option<String> {
    (!value.is_empty() && value.chars().count() < min)
        .then(|| format!("Must be at least {min} characters"))
}

pub fn max_length(max: usize, value: &str) -> Option<String> {
    (!value.is_empty() && value.chars().count() > max)
        .then(|| format!("Must be no more than {max} characters"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    Phone,
    IndexNumber,
    Pin,
    Serial,
    Otp,
    MinLength(usize),
    MaxLength(usize),
}

impl Rule {
    pub fn check(&self, value: &str) -> Option<String> {
        let message = match self {
            Rule::Required => required(value),
            Rule::Email => email(value),
            Rule::Phone => phone(value),
            Rule::IndexNumber => index_number(value),
            Rule::Pin => pin(value),
            Rule::Serial => serial(value),
            Rule::Otp => otp(value),
            Rule::MinLength(min) => return min_length(*min, value),
            Rule::MaxLength(max) => return max_length(*max, value),
        };
        message.map(str::to_string)
    }
}

/// Values, errors and touched flags for a set of named fields.
///
/// Errors only surface through [`FormValidator::field_error`] once the field
/// has been touched (blurred, or validated with `validate_all`).
#[derive(Debug, Clone)]
pub struct FormValidator {
    initial: BTreeMap<String, String>,
    rules: Vec<(String, Vec<Rule>)>,
    values: BTreeMap<String, String>,
    errors: BTreeMap<String, Option<String>>,
    touched: BTreeMap<String, bool>,
}

impl FormValidator {
    pub fn new<'a>(
        initial: impl IntoIterator<Item = (&'a str, &'a str)>,
        rules: impl IntoIterator<Item = (&'a str, Vec<Rule>)>,
    ) -> Self {
        let initial: BTreeMap<String, String> = initial
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: initial.clone(),
            initial,
            rules: rules
                .into_iter()
                .map(|(k, r)| (k.to_string(), r))
                .collect(),
            errors: BTreeMap::new(),
            touched: BTreeMap::new(),
        }
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn errors(&self) -> &BTreeMap<String, Option<String>> {
        &self.errors
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.get(name).copied().unwrap_or(false)
    }

    /// Updates a value and clears any error already shown for it.
    pub fn change(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
        if let Some(error) = self.errors.get_mut(name)
            && error.is_some()
        {
            *error = None;
        }
    }

    pub fn blur(&mut self, name: &str) {
        self.touched.insert(name.to_string(), true);
        let error = self.validate_field(name, self.value(name));
        self.errors.insert(name.to_string(), error);
    }

    pub fn validate_field(&self, name: &str, value: &str) -> Option<String> {
        let (_, rules) = self.rules.iter().find(|(field, _)| field == name)?;
        rules.iter().find_map(|rule| rule.check(value))
    }

    /// Validates and touches every field that has rules.
    pub fn validate_all(&mut self) -> bool {
        let mut valid = true;
        for (name, _) in &self.rules {
            let error = self.validate_field(name, self.value(name));
            valid &= error.is_none();
            self.errors.insert(name.clone(), error);
            self.touched.insert(name.clone(), true);
        }
        valid
    }

    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        if !self.is_touched(name) {
            return None;
        }
        self.errors.get(name).and_then(|e| e.as_deref())
    }

    pub fn is_valid(&self) -> bool {
        self.errors.values().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(required(""), Some(REQUIRED));
        assert_eq!(required("  "), Some(REQUIRED));
        assert_eq!(required("hello"), None);
    }

    #[test]
    fn test_email() {
        assert_eq!(email("test@example.com"), None);
        assert_eq!(email("user.name@domain.co.uk"), None);
        assert_eq!(email("invalid"), Some(INVALID_EMAIL));
        assert_eq!(email("test@"), Some(INVALID_EMAIL));
        assert_eq!(email("@domain.com"), Some(INVALID_EMAIL));
        assert_eq!(email("a b@c.d"), Some(INVALID_EMAIL));
        assert_eq!(email(""), None);
    }

    #[test]
    fn test_phone() {
        assert_eq!(phone("0545142658"), None);
        assert_eq!(phone("+233545142658"), None);
        assert_eq!(phone("054 514 2658"), None);
        assert_eq!(phone("12345"), Some(INVALID_PHONE));
        assert_eq!(phone("abc"), Some(INVALID_PHONE));
        assert_eq!(phone("05451426581"), Some(INVALID_PHONE));
    }

    #[test]
    fn test_index_number() {
        assert_eq!(index_number("1234567890"), None);
        assert_eq!(index_number("1234567890AB"), None);
        assert_eq!(index_number("12345"), Some(SHORT_INDEX_NUMBER));
        assert_eq!(index_number("ABCDEFGHIJ"), Some(INVALID_INDEX_NUMBER));
        assert_eq!(index_number("1234567890-1"), Some(INVALID_INDEX_NUMBER));
    }

    #[test]
    fn test_patterns_edge_cases() {
        assert_eq!(email("a@.b"), Some(INVALID_EMAIL));
        assert_eq!(email("a@b.."), None);
        assert_eq!(email("a@@b.c"), Some(INVALID_EMAIL));
        assert_eq!(email("a@exa\u{a0}mple.com"), Some(INVALID_EMAIL));
        assert_eq!(phone("\u{ff10}545142658"), Some(INVALID_PHONE));
        assert_eq!(phone("+2330545142658"), Some(INVALID_PHONE));
        assert_eq!(index_number("1234567890ab"), None);
        assert_eq!(index_number("\u{ff11}234567890"), Some(INVALID_INDEX_NUMBER));
        assert_eq!(otp("\u{ff11}23456"), Some(INVALID_OTP));
    }

    #[test]
    fn test_otp() {
        assert_eq!(otp("123456"), None);
        assert_eq!(otp("000000"), None);
        assert_eq!(otp("12345"), Some(INVALID_OTP));
        assert_eq!(otp("1234567"), Some(INVALID_OTP));
        assert_eq!(otp("abcdef"), Some(INVALID_OTP));
    }

    #[test]
    fn test_pin_serial_and_lengths() {
        assert_eq!(pin("ABCD1234"), None);
        assert_eq!(pin("ABC"), Some(SHORT_PIN));
        assert_eq!(serial("WA2024123456789"), None);
        assert_eq!(serial("WA2024"), Some(SHORT_SERIAL));
        assert_eq!(min_length(5, "hello"), None);
        assert_eq!(min_length(5, "hi").as_deref(), Some("Must be at least 5 characters"));
        assert_eq!(max_length(3, "four").as_deref(), Some("Must be no more than 3 characters"));
    }

    fn contact_form(email: &str, phone: &str) -> FormValidator {
        FormValidator::new(
            [("email", email), ("phone", phone)],
            [
                ("email", vec![Rule::Required, Rule::Email]),
                ("phone", vec![Rule::Required, Rule::Phone]),
            ],
        )
    }

    #[test]
    fn test_form_starts_clean() {
        let form = contact_form("", "");
        assert_eq!(form.value("email"), "");
        assert!(form.errors().is_empty());
        assert!(!form.is_touched("email"));
    }

    #[test]
    fn test_blur_validates_field() {
        let mut form = contact_form("", "");
        form.blur("email");
        assert!(form.is_touched("email"));
        assert_eq!(form.field_error("email"), Some(REQUIRED));
        assert_eq!(form.field_error("phone"), None);
    }

    #[test]
    fn test_change_clears_error() {
        let mut form = contact_form("", "");
        form.blur("email");
        form.change("email", "test@example.com");
        assert_eq!(form.value("email"), "test@example.com");
        assert_eq!(form.field_error("email"), None);
    }

    #[test]
    fn test_validate_all() {
        let mut form = contact_form("", "");
        assert!(!form.validate_all());
        assert_eq!(form.field_error("email"), Some(REQUIRED));
        assert_eq!(form.field_error("phone"), Some(REQUIRED));

        let mut form = contact_form("test@example.com", "0545142658");
        assert!(form.validate_all());
        assert!(form.is_valid());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut form = contact_form("", "");
        form.change("email", "test@example.com");
        form.validate_all();
        form.reset();
        assert_eq!(form.value("email"), "");
        assert!(form.errors().is_empty());
        assert!(!form.is_touched("phone"));
    }
}

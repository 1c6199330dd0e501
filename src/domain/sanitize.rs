//! Input sanitization for user-provided text.

use crate::domain::validation;

const DANGEROUS_SCHEMES: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];
const SAFE_PREFIXES: [&str; 6] = ["http://", "https://", "mailto:", "tel:", "/", "#"];
const MAX_TEXT_LEN: usize = 10_000;

/// Escapes the characters that matter when text lands inside HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            other => out.push(other),
        }
    }
    out
}

/// Returns `url` untouched when it is safe to link to, otherwise an empty string.
pub fn sanitize_url(url: &str) -> String {
    let normalized = url.trim().to_lowercase();
    if DANGEROUS_SCHEMES.iter().any(|s| normalized.starts_with(s)) {
        tracing::warn!(url, "blocked dangerous url");
        return String::new();
    }
    let safe = SAFE_PREFIXES.iter().any(|p| normalized.starts_with(p)) || !normalized.contains(':');
    if safe { url.to_string() } else { String::new() }
}

pub fn sanitize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+' || *c == '-' || c.is_whitespace())
        .collect()
}

/// [`sanitize_phone`] with the separators removed as well: `+233 54-514` becomes `+23354514`.
pub fn compact_phone(phone: &str) -> String {
    sanitize_phone(phone)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

pub fn sanitize_index_number(index_number: &str) -> String {
    index_number
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn sanitize_pin_serial(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Trimmed, lower-cased address, or an empty string when it is not an email.
pub fn sanitize_email(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    if validation::is_email(&normalized) {
        normalized
    } else {
        String::new()
    }
}

/// Collapses whitespace runs, trims, and caps the length.
pub fn safe_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_TEXT_LEN)
        .collect()
}

/// Parses a finite number within `[min, max]`.
pub fn safe_number(value: &str, min: f64, max: f64) -> Option<f64> {
    let number: f64 = value.trim().parse().ok()?;
    (number.is_finite() && number >= min && number <= max).then_some(number)
}

pub fn is_trusted_origin(origin: &str, own_origin: &str) -> bool {
    [own_origin, "https://resultgate.com", "https://www.resultgate.com"].contains(&origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">'hi'</a>"),
            "&lt;a href&#x3D;&quot;x&quot;&gt;&#x27;hi&#x27;&lt;&#x2F;a&gt;"
        );
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_sanitize_url() {
        assert_eq!(sanitize_url("javascript:alert(1)"), "");
        assert_eq!(sanitize_url("  JavaScript:alert(1)"), "");
        assert_eq!(sanitize_url("data:text/html,x"), "");
        assert_eq!(sanitize_url("https://resultgate.com"), "https://resultgate.com");
        assert_eq!(sanitize_url("/bulk"), "/bulk");
        assert_eq!(sanitize_url("faq"), "faq");
        assert_eq!(sanitize_url("ftp://host"), "");
    }

    #[test]
    fn test_character_filters() {
        assert_eq!(sanitize_phone("+233 (54) 514-2658"), "+233 54 514-2658");
        assert_eq!(compact_phone("+233 (54) 514-2658"), "+233545142658");
        assert_eq!(sanitize_index_number("12345-67890ab"), "1234567890AB");
        assert_eq!(sanitize_pin_serial(" rg-ab12;cd "), "RG-AB12CD");
    }

    #[test]
    fn test_sanitize_email() {
        assert_eq!(sanitize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(sanitize_email("not-an-email"), "");
    }

    #[test]
    fn test_safe_text_and_number() {
        assert_eq!(safe_text("  a \n\t b  "), "a b");
        assert_eq!(safe_text(&"x".repeat(20_000)).len(), MAX_TEXT_LEN);
        assert_eq!(safe_number("42", 0.0, 100.0), Some(42.0));
        assert_eq!(safe_number("-1", 0.0, 100.0), None);
        assert_eq!(safe_number("NaN", 0.0, 100.0), None);
        assert_eq!(safe_number("abc", 0.0, 100.0), None);
    }

    #[test]
    fn test_trusted_origin() {
        assert!(is_trusted_origin("http://localhost:5173", "http://localhost:5173"));
        assert!(is_trusted_origin("https://resultgate.com", "http://localhost:5173"));
        assert!(!is_trusted_origin("https://evil.example", "http://localhost:5173"));
    }
}

//! Best-effort PII scrubbing for free-text descriptions. Regex matching
//! only; this is not a guarantee of complete PII removal.

use std::sync::LazyLock;

use regex::Regex;

pub const EMAIL_PLACEHOLDER: &str = "[email removed]";
pub const PHONE_PLACEHOLDER: &str = "[phone removed]";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});

// Requires a separator-heavy shape so plain integers (salaries, years)
// don't match: an optional +CC, then 3 groups of digits with separators.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\+\d{1,3}[\s.-]?)?(\(\d{2,4}\)[\s.-]?)?\d{2,4}([\s.-]\d{2,6}){1,3}")
        .expect("phone regex")
});

/// Replace email- and phone-shaped substrings with fixed placeholders.
pub fn redact(text: &str) -> String {
    let pass = EMAIL_RE.replace_all(text, EMAIL_PLACEHOLDER);
    PHONE_RE.replace_all(&pass, PHONE_PLACEHOLDER).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_replaced() {
        let out = redact("Apply at jobs@acme.example.com today");
        assert_eq!(out, format!("Apply at {} today", EMAIL_PLACEHOLDER));
    }

    #[test]
    fn phone_numbers_are_replaced() {
        let out = redact("Call +1 415-555-0133 or (030) 1234 5678.");
        assert!(out.contains(PHONE_PLACEHOLDER));
        assert!(!out.contains("415"));
        assert!(!out.contains("5678"));
    }

    #[test]
    fn plain_numbers_survive() {
        let out = redact("Salary up to 120000 per year, posted 2026");
        assert_eq!(out, "Salary up to 120000 per year, posted 2026");
    }

    #[test]
    fn text_without_pii_is_untouched() {
        assert_eq!(redact("Build distributed systems"), "Build distributed systems");
    }
}

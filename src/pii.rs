//! PII redaction — strips emails, phone numbers and 11-digit national ids
//! from free text before it is persisted.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("invalid email pattern")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\+?90)?\s*\(?\d{3}\)?\s*\d{3}\s*\d{2}\s*\d{2}\b")
        .expect("invalid phone pattern")
});

static NATIONAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{11}\b").expect("invalid id pattern"));

/// Remove email addresses, phone numbers and 11-digit ids from text.
pub fn redact(text: &str) -> String {
    let t = EMAIL_RE.replace_all(text, "[REDACTED_EMAIL]");
    let t = PHONE_RE.replace_all(&t, "[REDACTED_PHONE]");
    let t = NATIONAL_ID_RE.replace_all(&t, "[REDACTED_ID]");
    t.into_owned()
}

//! Notification e-mail list validation for the alarm form.

use std::sync::LazyLock;

use regex::Regex;

pub const EMAIL_LIST_MESSAGE: &str =
    "Emails must be a comma separated list of addresses like name@example.com";

/// One `@`, a dot in the domain, no whitespace or commas.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s,]+@[^@\s,]+\.[^@\s,]+$").expect("static email pattern compiles")
});

pub fn is_email(candidate: &str) -> bool {
    EMAIL_RE.is_match(candidate)
}

/// Validate a comma separated address list and return it normalised
/// (items trimmed, joined with `,`).
///
/// The error names the expected format, not the offending address.
pub fn validate_email_list(raw: &str) -> Result<String, &'static str> {
    let items: Vec<&str> = raw.split(',').map(str::trim).collect();
    if items.iter().any(|item| !is_email(item)) {
        return Err(EMAIL_LIST_MESSAGE);
    }
    Ok(items.join(","))
}

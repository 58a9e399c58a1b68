use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Email pattern: standard email addresses
fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
    });
    &EMAIL_REGEX
}

/// Compact JWS pattern: three base64url segments joined by dots
fn bearer_token_regex() -> &'static Regex {
    static JWS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\b").unwrap()
    });
    &JWS_REGEX
}

/// Masks emails and signed tokens in free-form text.
///
/// Emails keep the first character of the local part and the full domain.
/// Compact signed tokens are replaced with `[REDACTED_TOKEN]`.
pub fn redact(input: &str) -> String {
    let tokens_redacted = bearer_token_regex().replace_all(input, "[REDACTED_TOKEN]");

    email_regex()
        .replace_all(&tokens_redacted, |caps: &regex::Captures| {
            let full_match = &caps[0];
            match full_match.find('@') {
                Some(0) | None => full_match.to_string(),
                Some(at_pos) => {
                    let first_char = &full_match[..1];
                    format!("{first_char}***{}", &full_match[at_pos..])
                }
            }
        })
        .into_owned()
}

/// Display wrapper that redacts its contents when formatted.
///
/// Use at log call sites: `warn!(email = %Redacted(&email), "...")`.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

//! Sanitization helpers that keep secrets and user content out of logs and
//! out of generated replies.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::utils::truncate_string;

/// Default timeout applied to outbound HTTP requests.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of attempts made for a failing external API call.
pub const API_RETRY_ATTEMPTS: u32 = 3;

/// Exponential backoff base: attempt `n` waits `API_RETRY_BACKOFF^n` seconds.
pub const API_RETRY_BACKOFF: u64 = 2;

/// Maximum number of characters accepted from user input.
pub const MAX_INPUT_LENGTH: usize = 2000;

/// Logged user content is cut to this many characters.
pub const LOG_MESSAGE_TRUNCATE: usize = 100;

/// Replacement text for anything redacted.
pub const REDACTED: &str = "[REDACTED]";

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("valid URL regex"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("valid email regex")
});

static SECRET_ASSIGNMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[\s:=]+\S+").expect("valid secret regex")
});

static OPENAI_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-[A-Za-z0-9_-]{10,}").expect("valid api key regex"));

static LONG_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9_-]{50,}\b").expect("valid token regex"));

/// Makes arbitrary text safe to write to the log.
///
/// The text is cut to [`LOG_MESSAGE_TRUNCATE`] characters (with a
/// `... (truncated)` marker) and then URLs, email addresses and anything that
/// looks like a `password=`/`token:`/`key`/`secret` assignment are replaced
/// by [`REDACTED`].
pub fn sanitize_for_log(message: &str) -> String {
    let mut text = if message.chars().count() > LOG_MESSAGE_TRUNCATE {
        let mut cut: String = message.chars().take(LOG_MESSAGE_TRUNCATE).collect();
        cut.push_str("... (truncated)");
        cut
    } else {
        message.to_string()
    };

    for pattern in [&*URL_PATTERN, &*EMAIL_PATTERN, &*SECRET_ASSIGNMENT_PATTERN] {
        text = pattern.replace_all(&text, REDACTED).into_owned();
    }
    text
}

/// Shows only the first and last four characters of an API key.
pub fn redact_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return REDACTED.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Strips credentials from model output before it reaches a channel.
///
/// OpenAI style `sk-`/`sk-proj-` keys and any unbroken token-like run of 50
/// or more characters are redacted. Ordinary prose is returned unchanged.
pub fn sanitize_ai_response(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = OPENAI_KEY_PATTERN.replace_all(text, REDACTED);
    LONG_TOKEN_PATTERN.replace_all(&text, REDACTED).into_owned()
}

/// Sanitizes generated text and bounds it to `max_chars` characters.
pub fn sanitize_generated(text: &str, max_chars: usize) -> String {
    truncate_string(sanitize_ai_response(text.trim()).as_str(), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_for_log_truncates() {
        let long = "x".repeat(150);
        let out = sanitize_for_log(&long);
        assert_eq!(out, format!("{}... (truncated)", "x".repeat(100)));
    }

    #[test]
    fn test_sanitize_for_log_redacts_urls_and_emails() {
        let out = sanitize_for_log("see https://example.com/a?b=c or mail coach@example.org");
        assert_eq!(out, "see [REDACTED] or mail [REDACTED]");
    }

    #[test]
    fn test_sanitize_for_log_redacts_secret_assignments() {
        let out = sanitize_for_log("login with password=hunter2 now");
        assert_eq!(out, "login with [REDACTED] now");
        let out = sanitize_for_log("TOKEN: abc.def");
        assert_eq!(out, "[REDACTED]");
    }

    #[test]
    fn test_sanitize_for_log_leaves_plain_text() {
        assert_eq!(sanitize_for_log("Nebraska 31, Iowa 24"), "Nebraska 31, Iowa 24");
    }

    #[test]
    fn test_redact_api_key() {
        assert_eq!(redact_api_key("short"), "[REDACTED]");
        assert_eq!(redact_api_key(""), "[REDACTED]");
        assert_eq!(redact_api_key("sk-1234567890abcd"), "sk-1...abcd");
    }

    #[test]
    fn test_sanitize_ai_response_passes_normal_text() {
        let text = "Nebraska plays Texas this week. Get your games done!";
        assert_eq!(sanitize_ai_response(text), text);
        assert_eq!(sanitize_ai_response("Team name: NebraskaCornhuskers2026"), "Team name: NebraskaCornhuskers2026");
        assert_eq!(sanitize_ai_response(""), "");
    }

    #[test]
    fn test_sanitize_ai_response_redacts_keys() {
        let out = sanitize_ai_response("Here is the key: sk-abc123def456ghi789jkl012mno345pqr");
        assert!(!out.contains("abc123"));
        assert!(out.contains(REDACTED));

        let out = sanitize_ai_response("Use sk-proj-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx");
        assert!(!out.contains("sk-proj-"));
    }

    #[test]
    fn test_sanitize_ai_response_redacts_long_tokens() {
        let text = format!("Token: {} end", "a".repeat(55));
        let out = sanitize_ai_response(&text);
        assert!(!out.contains(&"a".repeat(55)));
        assert_eq!(out, "Token: [REDACTED] end");
    }

    #[test]
    fn test_sanitize_generated_bounds_length() {
        let out = sanitize_generated(&"word ".repeat(100), 200);
        assert_eq!(out.chars().count(), 200);
        assert!(out.ends_with("..."));
    }
}

//! Input validation for values arriving from Discord users.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HarryError, Result};
use crate::sanitize::MAX_INPUT_LENGTH;

/// Matches a single user mention, with or without the nickname marker.
pub static DISCORD_MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?\d+>$").expect("valid mention regex"));

/// Strips NUL bytes, trims surrounding whitespace and cuts the result to
/// `max_chars` characters.
pub fn sanitize_input(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\0', "");
    cleaned.trim().chars().take(max_chars).collect()
}

/// [`sanitize_input`] with the default [`MAX_INPUT_LENGTH`] bound.
pub fn sanitize_default_input(text: &str) -> String {
    sanitize_input(text, MAX_INPUT_LENGTH)
}

/// Whether `value` parses as an integer inside the optional bounds.
pub fn is_safe_integer(value: &str, min: Option<i64>, max: Option<i64>) -> bool {
    let Ok(parsed) = value.trim().parse::<i64>() else {
        return false;
    };
    if min.is_some_and(|min| parsed < min) {
        return false;
    }
    if max.is_some_and(|max| parsed > max) {
        return false;
    }
    true
}

/// Whether `mention` is exactly one `<@id>` or `<@!id>` mention.
pub fn validate_discord_mention(mention: &str) -> bool {
    DISCORD_MENTION_REGEX.is_match(mention)
}

/// Rejects `value` when it is longer than `max_chars` characters.
pub fn validate_input_length(field: &str, value: &str, max_chars: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(HarryError::validation(
            field,
            format!("must be under {max_chars} characters (you provided {len} characters)"),
        ));
    }
    Ok(())
}

/// Validates that an integer lies in `[min, max]`.
pub fn validate_range<T>(field: &str, value: T, min: T, max: T) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(HarryError::validation(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("  hi\0 there  ", 100), "hi there");
        assert_eq!(sanitize_input("abcdef", 3), "abc");
    }

    #[test]
    fn test_is_safe_integer() {
        assert!(is_safe_integer("42", None, None));
        assert!(is_safe_integer("5", Some(1), Some(10)));
        assert!(!is_safe_integer("0", Some(1), None));
        assert!(!is_safe_integer("11", None, Some(10)));
        assert!(!is_safe_integer("abc", None, None));
    }

    #[test]
    fn test_validate_discord_mention() {
        assert!(validate_discord_mention("<@123456789>"));
        assert!(validate_discord_mention("<@!123456789>"));
        assert!(!validate_discord_mention("@123"));
        assert!(!validate_discord_mention("<@123> extra"));
        assert!(!validate_discord_mention("<#123>"));
    }

    #[test]
    fn test_validate_input_length() {
        assert!(validate_input_length("query", "short", 10).is_ok());
        let err = validate_input_length("query", "far too long", 5).unwrap_err();
        assert!(err.to_string().contains("under 5 characters"));
    }

    proptest! {
        #[test]
        fn test_validate_range_matches_bounds(value in -5_000i64..5_000) {
            let result = validate_range("timeout", value, 1, 1440);
            prop_assert_eq!(result.is_ok(), (1..=1440).contains(&value));
        }
    }
}

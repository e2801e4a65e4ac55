//! Shared string formatting helpers.

/// Truncates a string to at most `max_chars` characters, ending with `...`
/// when something was cut.
///
/// Counts characters rather than bytes so multi-byte text never splits.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = input.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Formats a number of seconds as a compact duration such as `1h 5m`,
/// `4m 10s` or `42s`.
pub fn format_duration_secs(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        let input = "This is a very long string that should be truncated";
        let truncated = truncate_string(input, 20);
        assert_eq!(truncated, "This is a very lo...");

        let short = "Short";
        let not_truncated = truncate_string(short, 20);
        assert_eq!(not_truncated, "Short");
    }

    #[test]
    fn test_truncate_string_multibyte() {
        let input = "🏈🏈🏈🏈🏈🏈🏈🏈";
        let truncated = truncate_string(input, 5);
        assert_eq!(truncated, "🏈🏈...");
        assert_eq!(truncated.chars().count(), 5);
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration_secs(42), "42s");
        assert_eq!(format_duration_secs(250), "4m 10s");
        assert_eq!(format_duration_secs(3900), "1h 5m");
    }
}

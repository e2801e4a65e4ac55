//! Text matching used to classify a target's message.

use harry_common::UserId;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// A user mention, with or without the nickname marker, capturing the id.
static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@!?(\d+)>").expect("valid mention regex"));

/// Word matchers built from configuration.
#[derive(Debug, Clone)]
pub struct MessageMatcher {
    trigger: Regex,
    insults: Option<Regex>,
}

impl MessageMatcher {
    /// Builds matchers for the trigger word and insult keywords. Matching is
    /// case-insensitive and finds keywords anywhere in the text, so
    /// "idiots" matches "idiot".
    pub fn new(trigger_word: &str, insult_keywords: &[String]) -> Result<Self, regex::Error> {
        let trigger = Regex::new(&format!(r"(?i){}", regex::escape(trigger_word.trim())))?;

        let keywords: Vec<String> = insult_keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        let insults = if keywords.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?i)(?:{})", keywords.join("|")))?)
        };

        Ok(Self { trigger, insults })
    }

    /// Whether the trigger word appears in `text`.
    pub fn mentions_trigger(&self, text: &str) -> bool {
        self.trigger.is_match(text)
    }

    /// Whether any insult keyword appears in `text`.
    pub fn contains_insult(&self, text: &str) -> bool {
        self.insults.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Extracts user mentions from free text, in order and without duplicates.
pub fn parse_mentions(text: &str) -> Vec<UserId> {
    let mut seen = HashSet::new();
    MENTION_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
        .filter(|id| seen.insert(*id))
        .map(UserId)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> MessageMatcher {
        MessageMatcher::new(
            "harry",
            &["idiot".to_string(), "shut up".to_string(), " ".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_trigger_word_is_case_insensitive_substring() {
        let m = matcher();
        assert!(m.mentions_trigger("HARRY you there?"));
        assert!(m.mentions_trigger("oi, harry."));
        assert!(m.mentions_trigger("harrybot sucks"));
        assert!(m.mentions_trigger("ask HarryS"));
        assert!(!m.mentions_trigger("hairy situation"));
    }

    #[test]
    fn test_insult_keywords() {
        let m = matcher();
        assert!(m.contains_insult("you IDIOT"));
        assert!(m.contains_insult("just shut up already"));
        assert!(m.contains_insult("idiotic play call"));
        assert!(m.contains_insult("you IDIOTS"));
        assert!(!m.contains_insult("good game"));
    }

    #[test]
    fn test_no_keywords_never_matches() {
        let m = MessageMatcher::new("harry", &[]).unwrap();
        assert!(!m.contains_insult("anything at all"));
    }

    #[test]
    fn test_parse_mentions() {
        let ids = parse_mentions("<@1> <@!2> and <@1> again, not <#3> or @4");
        assert_eq!(ids, vec![UserId(1), UserId(2)]);
        assert!(parse_mentions("nobody here").is_empty());
    }
}

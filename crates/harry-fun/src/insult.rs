//! Local insult and comeback templates.

use std::sync::Arc;

use crate::traits::RandomSource;

const INSULT_PHRASES: &[&str] = &[
    "Oi {mention}, you {intensifier} {noun} {emoji}",
    "Oh look, it's {mention}. What a {intensifier} {noun} {emoji}",
    "{mention} you {intensifier} {noun} {emoji}",
    "Hey {mention}... you're a {intensifier} {noun} {emoji}",
    "Shut it {mention}, ya {intensifier} {noun} {emoji}",
    "Nobody asked, {mention}, you {intensifier} {noun} {emoji}",
    "Specifically you, {mention}. {intensifier} {noun} behaviour {emoji}",
];

const COMEBACK_PHRASES: &[&str] = &[
    "Cry more, you {intensifier} {noun} {emoji}",
    "Is that the best you've got, ya {intensifier} {noun}? {emoji}",
    "What a load of bollocks. Sod off, you {intensifier} {noun} {emoji}",
    "Listen here you {intensifier} {noun}, shut your gob {emoji}",
    "Try harder, you {intensifier} {noun} {emoji}",
    "Aww, did I hurt your feelings, you {intensifier} {noun}? {emoji}",
    "You talk a lot of shite for a {intensifier} {noun} {emoji}",
    "Get in the bin, you {intensifier} {noun} {emoji}",
    "About as useful as a chocolate teapot, you {intensifier} {noun} {emoji}",
];

const INTENSIFIERS: &[&str] = &[
    "absolute", "complete", "utter", "total", "proper", "massive", "bloody", "certified",
];

const NOUNS: &[&str] = &[
    "muppet", "bellend", "numpty", "wanker", "plonker", "pillock", "donut", "melt", "knobhead",
    "walnut",
];

const EMOJIS: &[&str] = &["🖕", "😂", "🤡", "💩", "🙄", "💀", "🤣", "🗑️", "😴"];

/// Composes insults and comebacks from fixed vocabularies.
///
/// Every output is phrase + intensifier + noun + emoji with each part
/// chosen independently; nothing prevents two calls returning the same text.
#[derive(Clone)]
pub struct TemplateGenerator {
    random: Arc<dyn RandomSource>,
}

impl std::fmt::Debug for TemplateGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateGenerator").finish_non_exhaustive()
    }
}

impl TemplateGenerator {
    /// Creates a generator drawing from `random`.
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// An insult aimed at `mention`.
    pub fn insult(&self, mention: &str) -> String {
        self.compose(INSULT_PHRASES).replace("{mention}", mention)
    }

    /// A comeback for a target who answered back.
    pub fn comeback(&self) -> String {
        self.compose(COMEBACK_PHRASES)
    }

    fn compose(&self, phrases: &[&str]) -> String {
        let phrase = self.choose(phrases);
        let intensifier = self.choose(INTENSIFIERS);
        let noun = self.choose(NOUNS);
        let emoji = self.choose(EMOJIS);
        let text = phrase
            .replace("{intensifier}", intensifier)
            .replace("{noun}", noun)
            .replace("{emoji}", emoji);
        capitalize_first(&text)
    }

    fn choose<'a>(&self, options: &[&'a str]) -> &'a str {
        options[self.random.pick(options.len()).min(options.len() - 1)]
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FastRandSource;
    use proptest::prelude::*;

    fn grammar_accepts(text: &str, phrases: &[&str], mention: &str) -> bool {
        phrases.iter().any(|phrase| {
            INTENSIFIERS.iter().any(|i| {
                NOUNS.iter().any(|n| {
                    EMOJIS.iter().any(|e| {
                        let expected = phrase
                            .replace("{mention}", mention)
                            .replace("{intensifier}", i)
                            .replace("{noun}", n)
                            .replace("{emoji}", e);
                        capitalize_first(&expected) == text
                    })
                })
            })
        })
    }

    #[test]
    fn test_insult_mentions_target() {
        let generator = TemplateGenerator::new(Arc::new(FastRandSource::seeded(3)));
        let text = generator.insult("<@42>");
        assert!(text.contains("<@42>"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("specific"), "Specific");
        assert_eq!(capitalize_first("<@1> hi"), "<@1> hi");
        assert_eq!(capitalize_first(""), "");
    }

    proptest! {
        #[test]
        fn test_outputs_come_from_the_grammar(seed in any::<u64>()) {
            let generator = TemplateGenerator::new(Arc::new(FastRandSource::seeded(seed)));
            let insult = generator.insult("<@7>");
            prop_assert!(grammar_accepts(&insult, INSULT_PHRASES, "<@7>"));
            let comeback = generator.comeback();
            prop_assert!(grammar_accepts(&comeback, COMEBACK_PHRASES, ""));
        }
    }
}

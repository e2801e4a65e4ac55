//! Comebacks for targets who answer back, generated or from templates.

use harry_common::{sanitize_generated, sanitize_input};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::insult::TemplateGenerator;
use crate::traits::TextGenerator;

/// Longest slice of the target's message quoted into a prompt.
const PROMPT_QUOTE_CHARS: usize = 500;

/// Builds the prompt asking for a comeback to `their_message`.
pub fn comeback_prompt(user_name: &str, their_message: &str, max_chars: usize) -> String {
    let user_name = sanitize_input(user_name, 100);
    let their_message = sanitize_input(their_message, PROMPT_QUOTE_CHARS);
    format!(
        "You are Harry, a foul-mouthed British football bot. You just had a go at {user_name} \
         and they responded with: \"{their_message}\"\n\n\
         Write a SHORT comeback that:\n\
         - Is rude and heavy on British slang (mate, ya muppet, bollocks, sod off)\n\
         - References what they said and roasts them for it\n\
         - Is 1-2 sentences\n\
         - Ends with an emoji\n\n\
         Your comeback (max {max_chars} chars):"
    )
}

/// Chooses between generated and template comebacks.
///
/// Without a generator, or when generation fails or comes back empty, the
/// reply is a template. Generated text is sanitized and cut to `max_chars`.
#[derive(Clone)]
pub struct ResponseGenerator {
    generator: Option<Arc<dyn TextGenerator>>,
    templates: TemplateGenerator,
    max_chars: usize,
}

impl std::fmt::Debug for ResponseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("ai_enabled", &self.generator.is_some())
            .field("max_chars", &self.max_chars)
            .finish_non_exhaustive()
    }
}

impl ResponseGenerator {
    /// Creates a response generator.
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        templates: TemplateGenerator,
        max_chars: usize,
    ) -> Self {
        Self {
            generator,
            templates,
            max_chars,
        }
    }

    /// Whether comebacks are generated rather than templated.
    pub const fn ai_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// An insult aimed at `mention`. Always from templates.
    pub fn insult(&self, mention: &str) -> String {
        self.templates.insult(mention)
    }

    /// A comeback for `user_name` who said `their_message`.
    pub async fn comeback(&self, user_name: &str, their_message: &str) -> String {
        let Some(generator) = &self.generator else {
            return self.templates.comeback();
        };

        let prompt = comeback_prompt(user_name, their_message, self.max_chars);
        match generator.generate(&prompt).await {
            Ok(text) => {
                let text = sanitize_generated(&text, self.max_chars);
                if text.is_empty() {
                    warn!("Generated comeback was empty, using a template");
                    self.templates.comeback()
                } else {
                    debug!("Generated comeback for {}", user_name);
                    text
                }
            }
            Err(e) => {
                warn!("Comeback generation failed, using a template: {}", e);
                self.templates.comeback()
            }
        }
    }
}

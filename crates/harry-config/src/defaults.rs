//! Default values for every configuration section.

use crate::schema::*;
use harry_common::LoggingConfig;

/// Default timeout between organic trolls, in minutes.
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 30;

/// Default chance of reacting to a target's message.
pub const DEFAULT_REACTION_CHANCE: f64 = 0.25;

/// Default length cap for generated comebacks.
pub const DEFAULT_MAX_COMEBACK_CHARS: usize = 200;

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig::default(),
            ai: AiConfig::default(),
            fun: FunConfig::default(),
            budget: BudgetConfig::default(),
            monitoring: MonitoringConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            admin_ids: Vec::new(),
            dev_guild_id: None,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_comeback_chars: DEFAULT_MAX_COMEBACK_CHARS,
            max_tokens: 150,
            timeout_seconds: 30,
            input_cost_per_1k: 0.000_15,
            output_cost_per_1k: 0.000_6,
        }
    }
}

impl Default for FunConfig {
    fn default() -> Self {
        Self {
            trigger_word: "harry".to_string(),
            insult_keywords: [
                "fuck", "shit", "idiot", "stupid", "dumb", "shut up", "wanker", "muppet",
                "bellend", "twat", "loser", "trash", "bollocks", "piss off",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            reaction_chance: DEFAULT_REACTION_CHANCE,
            reaction_emojis: ["🖕", "😂", "🤡", "💩", "🙄", "😴", "🥱", "🤣"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            dedup_window_seconds: 5,
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            ai_monthly: 10.0,
            zyte_monthly: 10.0,
            total_monthly: 20.0,
            zyte_spend_limit: 0.0,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            error_reporting_dsn: None,
            environment: "production".to_string(),
            slow_command_seconds: 5.0,
        }
    }
}

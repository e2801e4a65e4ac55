//! Configuration schema definitions using serde.

use harry_common::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Main configuration structure for Harry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// AI text generation configuration.
    pub ai: AiConfig,
    /// Trolling subsystem configuration.
    pub fun: FunConfig,
    /// Monthly API spending configuration.
    pub budget: BudgetConfig,
    /// Metrics and error reporting configuration.
    pub monitoring: MonitoringConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// User ids allowed to run admin commands without the Administrator
    /// permission.
    pub admin_ids: Vec<u64>,
    /// When set, commands are registered to this guild only, which takes
    /// effect immediately instead of after global propagation.
    pub dev_guild_id: Option<u64>,
}

/// OpenAI-compatible chat completion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// API key. Text generation is disabled when empty.
    pub api_key: String,
    /// Base URL of the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Generated comebacks are cut to this many characters.
    pub max_comeback_chars: usize,
    /// Maximum tokens requested per completion.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Price per 1K prompt tokens in USD.
    pub input_cost_per_1k: f64,
    /// Price per 1K completion tokens in USD.
    pub output_cost_per_1k: f64,
}

impl AiConfig {
    /// Whether an API key is configured.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Trolling subsystem configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunConfig {
    /// Word that summons Harry when a target says it.
    pub trigger_word: String,
    /// Words that count as a target insulting Harry.
    pub insult_keywords: Vec<String>,
    /// Probability of reacting to a target's message.
    pub reaction_chance: f64,
    /// Emoji used for reactions.
    pub reaction_emojis: Vec<String>,
    /// Timeout offered by `/fun target` when none is given.
    pub default_timeout_minutes: u32,
    /// Window in which a repeated command invocation is ignored.
    pub dedup_window_seconds: u64,
}

/// Monthly API budgets in USD. A budget of zero disables its alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// AI spending budget.
    pub ai_monthly: f64,
    /// Zyte scraping spending budget.
    pub zyte_monthly: f64,
    /// Combined spending budget.
    pub total_monthly: f64,
    /// Hard cap on Zyte spend; zero disables the cap.
    pub zyte_spend_limit: f64,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Error tracking DSN. Error reporting is disabled when unset.
    pub error_reporting_dsn: Option<String>,
    /// Deployment environment label attached to reports.
    pub environment: String,
    /// Commands slower than this are logged as warnings.
    pub slow_command_seconds: f64,
}

//! Runtime validation of a loaded configuration.

use crate::schema::Config;
use harry_common::{HarryError, Result};
use url::Url;

/// Smallest timeout a target may be given, in minutes.
pub const MIN_TIMEOUT_MINUTES: u32 = 1;
/// Largest timeout a target may be given, in minutes (24 hours).
pub const MAX_TIMEOUT_MINUTES: u32 = 1440;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting every problem at once.
    pub fn validate(config: &Config) -> Result<()> {
        let problems = Self::problems(config);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(HarryError::config(problems.join("; ")))
        }
    }

    /// Lists every problem found in `config`.
    pub fn problems(config: &Config) -> Vec<String> {
        let mut problems = Vec::new();

        if config.discord.token.trim().is_empty() {
            problems.push("Discord token cannot be empty".to_string());
        }

        match Url::parse(&config.ai.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => problems.push(format!(
                "AI base URL must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => problems.push(format!("AI base URL is invalid: {e}")),
        }
        if config.ai.model.trim().is_empty() {
            problems.push("AI model cannot be empty".to_string());
        }
        if !(20..=2000).contains(&config.ai.max_comeback_chars) {
            problems.push("AI max_comeback_chars must be between 20 and 2000".to_string());
        }
        if config.ai.timeout_seconds == 0 {
            problems.push("AI timeout_seconds must be positive".to_string());
        }
        for (name, cost) in [
            ("input_cost_per_1k", config.ai.input_cost_per_1k),
            ("output_cost_per_1k", config.ai.output_cost_per_1k),
        ] {
            if !cost.is_finite() || cost < 0.0 {
                problems.push(format!("AI {name} must be a non-negative number"));
            }
        }

        let trigger = config.fun.trigger_word.trim();
        if trigger.is_empty() || trigger.contains(char::is_whitespace) {
            problems.push("Fun trigger_word must be a single non-empty word".to_string());
        }
        if !(0.0..=1.0).contains(&config.fun.reaction_chance) {
            problems.push("Fun reaction_chance must be between 0.0 and 1.0".to_string());
        }
        if config.fun.reaction_emojis.is_empty() {
            problems.push("Fun reaction_emojis cannot be empty".to_string());
        }
        if !(MIN_TIMEOUT_MINUTES..=MAX_TIMEOUT_MINUTES).contains(&config.fun.default_timeout_minutes) {
            problems.push(format!(
                "Fun default_timeout_minutes must be between {MIN_TIMEOUT_MINUTES} and {MAX_TIMEOUT_MINUTES}"
            ));
        }

        for (name, amount) in [
            ("ai_monthly", config.budget.ai_monthly),
            ("zyte_monthly", config.budget.zyte_monthly),
            ("total_monthly", config.budget.total_monthly),
            ("zyte_spend_limit", config.budget.zyte_spend_limit),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                problems.push(format!("Budget {name} must be a non-negative number"));
            }
        }

        if let Some(dsn) = &config.monitoring.error_reporting_dsn {
            if let Err(e) = Url::parse(dsn) {
                problems.push(format!("Error reporting DSN is invalid: {e}"));
            }
        }
        if !config.monitoring.slow_command_seconds.is_finite()
            || config.monitoring.slow_command_seconds <= 0.0
        {
            problems.push("Monitoring slow_command_seconds must be positive".to_string());
        }

        problems
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.discord.token = "test_token".to_string();
        config
    }

    #[test]
    fn test_default_config_needs_only_a_token() {
        assert!(valid_config().validate().is_ok());
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("Discord token cannot be empty"));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = valid_config();
        config.ai.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.ai.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_fun_settings() {
        let mut config = valid_config();
        config.fun.reaction_chance = 1.5;
        config.fun.default_timeout_minutes = 0;
        config.fun.trigger_word = "two words".to_string();

        let problems = ConfigValidator::problems(&config);
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn test_rejects_negative_budget() {
        let mut config = valid_config();
        config.budget.zyte_spend_limit = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reports_all_problems_together() {
        let mut config = Config::default();
        config.monitoring.slow_command_seconds = 0.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Discord token"));
        assert!(err.contains("slow_command_seconds"));
    }
}

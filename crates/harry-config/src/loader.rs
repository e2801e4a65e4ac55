//! Configuration loading from TOML and the environment.

use crate::schema::Config;
use harry_common::{HarryError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "HARRY_CONFIG";

/// File used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Loads configuration from an optional TOML file plus environment overrides.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a loader for `HARRY_CONFIG`, falling back to `config.toml`.
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::new(path)
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file (if present) without applying the environment or
    /// validating.
    pub async fn load_file(&self) -> Result<Config> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                debug!("Read configuration from {}", self.path.display());
                parse_toml(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No configuration file at {}, using defaults",
                    self.path.display()
                );
                Ok(Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Loads, applies environment overrides and validates.
    pub async fn load(&self) -> Result<Config> {
        let mut config = self.load_file().await?;
        apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }
}

/// Parses a TOML document into a [`Config`]; missing sections use defaults.
pub fn parse_toml(contents: &str) -> Result<Config> {
    toml::from_str(contents)
        .map_err(|e| HarryError::config_with_source("failed to parse configuration file", e))
}

/// Applies overrides from the process environment.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_env_overrides_from(config, |key| std::env::var(key).ok())
}

/// Applies overrides using `lookup` to read variables.
///
/// Recognised variables: `DISCORD_TOKEN`, `HARRY_ADMIN_IDS` (comma separated),
/// `DEV_GUILD_ID`, `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL`,
/// `SENTRY_DSN`, `ENVIRONMENT`, `LOG_LEVEL`, `AI_MONTHLY_BUDGET`,
/// `ZYTE_MONTHLY_BUDGET`, `TOTAL_MONTHLY_BUDGET` and `ZYTE_SPEND_LIMIT`.
pub fn apply_env_overrides_from<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(token) = get("DISCORD_TOKEN") {
        config.discord.token = token;
    }
    if let Some(ids) = get("HARRY_ADMIN_IDS") {
        config.discord.admin_ids = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| parse_number::<u64>("HARRY_ADMIN_IDS", id))
            .collect::<Result<_>>()?;
    }
    if let Some(guild) = get("DEV_GUILD_ID") {
        config.discord.dev_guild_id = Some(parse_number("DEV_GUILD_ID", &guild)?);
    }
    if let Some(key) = get("OPENAI_API_KEY") {
        config.ai.api_key = key;
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        config.ai.base_url = url;
    }
    if let Some(model) = get("OPENAI_MODEL") {
        config.ai.model = model;
    }
    if let Some(dsn) = get("SENTRY_DSN") {
        config.monitoring.error_reporting_dsn = Some(dsn);
    }
    if let Some(environment) = get("ENVIRONMENT") {
        config.monitoring.environment = environment;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(amount) = get("AI_MONTHLY_BUDGET") {
        config.budget.ai_monthly = parse_number("AI_MONTHLY_BUDGET", &amount)?;
    }
    if let Some(amount) = get("ZYTE_MONTHLY_BUDGET") {
        config.budget.zyte_monthly = parse_number("ZYTE_MONTHLY_BUDGET", &amount)?;
    }
    if let Some(amount) = get("TOTAL_MONTHLY_BUDGET") {
        config.budget.total_monthly = parse_number("TOTAL_MONTHLY_BUDGET", &amount)?;
    }
    if let Some(amount) = get("ZYTE_SPEND_LIMIT") {
        config.budget.zyte_spend_limit = parse_number("ZYTE_SPEND_LIMIT", &amount)?;
    }

    Ok(())
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| HarryError::validation(key, format!("'{value}' is not a valid number: {e}")))
}

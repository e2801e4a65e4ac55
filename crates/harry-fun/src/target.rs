//! A targeted user and its per-target rules.

use harry_common::{validate_range, GuildId, UserId};
use harry_config::{MAX_TIMEOUT_MINUTES, MIN_TIMEOUT_MINUTES};
use std::time::Duration;

use crate::error::{FunError, FunResult};

/// Comebacks a target can draw before Harry goes quiet.
pub const MAX_ARGUMENTS: u8 = 5;

/// One user under engagement in one guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The targeted user.
    pub user_id: UserId,
    /// Guild the target belongs to.
    pub guild_id: GuildId,
    /// Minutes between organic trolls, in `1..=1440`.
    pub timeout_minutes: u32,
    /// Clock reading of the last organic troll; `None` until the first one.
    pub last_triggered: Option<Duration>,
    /// Whether Harry argues back.
    pub engage: bool,
    /// Comebacks sent since the last reset, at most [`MAX_ARGUMENTS`].
    pub argument_count: u8,
    /// Display name when targeted.
    pub display_name: String,
    /// Admin who enabled the target.
    pub enabled_by: UserId,
    /// That admin's display name.
    pub enabled_by_name: String,
}

impl Target {
    /// The timeout as a [`Duration`].
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_minutes as u64 * 60)
    }

    /// Whether an organic troll may fire at `now`.
    pub fn is_due(&self, now: Duration) -> bool {
        self.last_triggered
            .map_or(true, |last| now.saturating_sub(last) >= self.timeout())
    }

    /// Time since the last organic troll, if there was one.
    pub fn since_triggered(&self, now: Duration) -> Option<Duration> {
        self.last_triggered.map(|last| now.saturating_sub(last))
    }

    /// Time until the next organic troll may fire; zero when due.
    pub fn next_available_in(&self, now: Duration) -> Duration {
        self.since_triggered(now)
            .map_or(Duration::ZERO, |since| self.timeout().saturating_sub(since))
    }

    /// Whether the argument cap has been reached.
    pub const fn at_argument_cap(&self) -> bool {
        self.argument_count >= MAX_ARGUMENTS
    }
}

/// Checks a timeout lies in `1..=1440` minutes.
pub fn validate_timeout(minutes: u32) -> FunResult<u32> {
    validate_range("timeout", minutes, MIN_TIMEOUT_MINUTES, MAX_TIMEOUT_MINUTES).map_err(|_| {
        FunError::Validation(format!(
            "Timeout must be between {MIN_TIMEOUT_MINUTES} and {MAX_TIMEOUT_MINUTES} minutes (24 hours)!"
        ))
    })
}

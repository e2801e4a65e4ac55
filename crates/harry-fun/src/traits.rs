//! Capability traits for everything the tracker depends on.

use async_trait::async_trait;
use harry_common::{ChannelId, GuildId, MessageId, UserId};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use crate::error::FunResult;

/// Monotonic time source. Only differences between readings matter.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Starts a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Source of random choices.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;

    /// `true` with the given probability.
    fn chance(&self, probability: f64) -> bool;
}

/// [`RandomSource`] over a seedable `fastrand` generator.
#[derive(Debug)]
pub struct FastRandSource {
    rng: Mutex<fastrand::Rng>,
}

impl FastRandSource {
    /// Generator seeded from the OS.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Deterministic generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for FastRandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for FastRandSource {
    fn pick(&self, len: usize) -> usize {
        self.rng.lock().usize(..len.max(1))
    }

    fn chance(&self, probability: f64) -> bool {
        self.rng.lock().f64() < probability
    }
}

/// Sends messages and reactions to a chat channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts `text` in `channel` and returns the new message's id.
    async fn send_message(&self, channel: ChannelId, text: &str) -> FunResult<MessageId>;

    /// Adds `emoji` as a reaction to `message`.
    async fn add_reaction(&self, channel: ChannelId, message: MessageId, emoji: &str) -> FunResult<()>;
}

/// A guild member as seen when targeting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// The member's user id.
    pub user_id: UserId,
    /// Display name at lookup time.
    pub display_name: String,
    /// Whether the account is a bot.
    pub bot: bool,
}

/// Why a member could not be targeted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No such member in the guild.
    #[error("not found")]
    NotFound,
    /// The account is a bot.
    #[error("bot")]
    Bot {
        /// Display name of the bot.
        display_name: String,
    },
}

/// Looks up guild members.
#[async_trait]
pub trait MemberResolver: Send + Sync {
    /// Resolves `user` in `guild`, telling "not found" apart from "is a bot".
    async fn resolve_member(&self, guild: GuildId, user: UserId) -> Result<MemberInfo, ResolveError>;
}

/// Produces text from a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a reply for `prompt`. May fail.
    async fn generate(&self, prompt: &str) -> FunResult<String>;
}

/// Whoever invoked an admin operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The caller's user id.
    pub user_id: UserId,
    /// Display name, recorded as "enabled by".
    pub display_name: String,
    /// Whether they hold the Administrator permission in the guild.
    pub guild_administrator: bool,
}

/// Decides who may manage targets.
pub trait Authorizer: Send + Sync {
    /// Whether `caller` is an admin in `guild`.
    fn is_admin(&self, caller: &Caller, guild: GuildId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sources_repeat() {
        let a = FastRandSource::seeded(7);
        let b = FastRandSource::seeded(7);
        let left: Vec<usize> = (0..20).map(|_| a.pick(10)).collect();
        let right: Vec<usize> = (0..20).map(|_| b.pick(10)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|&i| i < 10));
    }

    #[test]
    fn test_chance_extremes() {
        let source = FastRandSource::seeded(1);
        assert!((0..100).all(|_| !source.chance(0.0)));
        assert!((0..100).all(|_| source.chance(1.0)));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}

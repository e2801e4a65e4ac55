//! Test utilities and shared test helpers for Harry.
//!
//! This module provides common testing utilities and fixtures that can be
//! used across all crates in the workspace for unit and integration testing.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{ChannelId, GuildId, MessageId, UserId};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Discord-related test utilities.
pub mod discord_fixtures {
    use super::*;

    /// A guild used by most tests.
    pub const fn test_guild_id() -> GuildId {
        GuildId(111_111_111_111_111_111)
    }

    /// A second guild for isolation tests.
    pub const fn other_guild_id() -> GuildId {
        GuildId(222_222_222_222_222_222)
    }

    /// Create a test channel ID.
    pub const fn test_channel_id() -> ChannelId {
        ChannelId(123_456_789_012_345_678)
    }

    /// Create a test user ID.
    pub const fn test_user_id() -> UserId {
        UserId(987_654_321_098_765_432)
    }

    /// The admin who enables targets in tests.
    pub const fn test_admin_id() -> UserId {
        UserId(555_555_555_555_555_555)
    }

    /// Create a test message ID.
    pub const fn test_message_id(n: u64) -> MessageId {
        MessageId(900_000_000_000_000_000 + n)
    }

    /// Create multiple test user IDs.
    pub fn test_user_ids(count: usize) -> Vec<UserId> {
        (0..count as u64)
            .map(|i| UserId(100_000_000_000_000_000 + i))
            .collect()
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating valid Discord user IDs.
    pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
        (100_000_000_000_000_000u64..=999_999_999_999_999_999u64).prop_map(UserId)
    }

    /// Strategy for generating valid Discord guild IDs.
    pub fn guild_id_strategy() -> impl Strategy<Value = GuildId> {
        (100_000_000_000_000_000u64..=999_999_999_999_999_999u64).prop_map(GuildId)
    }
}

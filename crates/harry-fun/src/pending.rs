//! Automated messages awaiting a reply from their target.

use harry_common::{GuildId, MessageId, UserId};
use parking_lot::Mutex;
use tracing::debug;

use crate::bounded::BoundedMap;

/// Who an automated message was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingResponse {
    /// Guild the message was sent in.
    pub guild_id: GuildId,
    /// Target the message was aimed at.
    pub user_id: UserId,
}

/// Bounded set of automated messages a target may reply to.
#[derive(Debug, Default)]
pub struct PendingResponses {
    inner: Mutex<BoundedMap<MessageId, PendingResponse>>,
}

impl PendingResponses {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers that `message` was aimed at `user` in `guild`.
    pub fn record(&self, message: MessageId, guild_id: GuildId, user_id: UserId) {
        let evicted = self
            .inner
            .lock()
            .insert(message, PendingResponse { guild_id, user_id });
        if evicted > 0 {
            debug!("Cleaned up {} old pending responses", evicted);
        }
    }

    /// Looks up who `message` was aimed at.
    pub fn lookup(&self, message: MessageId) -> Option<PendingResponse> {
        self.inner.lock().get(&message).copied()
    }

    /// Number of tracked messages.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

//! Channels where Harry keeps quiet unless spoken to.

use dashmap::DashSet;
use harry_common::ChannelId;
use tracing::info;

/// Block list for unprompted responses.
///
/// In a blocked channel targets still get answered when they reply to Harry
/// or summon him; organic trolls and insult comebacks are suppressed.
#[derive(Debug, Default)]
pub struct ChannelManager {
    blocked: DashSet<ChannelId>,
}

impl ChannelManager {
    /// Creates an empty block list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks a channel. Returns `false` if it already was.
    pub fn block_channel(&self, channel: ChannelId) -> bool {
        let added = self.blocked.insert(channel);
        if added {
            info!("Blocked unprompted responses in channel {}", channel);
        }
        added
    }

    /// Unblocks a channel. Returns `false` if it wasn't blocked.
    pub fn unblock_channel(&self, channel: ChannelId) -> bool {
        let removed = self.blocked.remove(&channel).is_some();
        if removed {
            info!("Unblocked channel {}", channel);
        }
        removed
    }

    /// Whether unprompted responses are blocked in `channel`.
    pub fn is_blocked(&self, channel: ChannelId) -> bool {
        self.blocked.contains(&channel)
    }

    /// Blocked channels, sorted by id.
    pub fn blocked_channels(&self) -> Vec<ChannelId> {
        let mut channels: Vec<ChannelId> = self.blocked.iter().map(|c| *c).collect();
        channels.sort_unstable();
        channels
    }

    /// Number of blocked channels.
    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_and_unblock() {
        let channels = ChannelManager::new();
        assert!(channels.block_channel(ChannelId(2)));
        assert!(!channels.block_channel(ChannelId(2)));
        assert!(channels.block_channel(ChannelId(1)));
        assert!(channels.is_blocked(ChannelId(2)));
        assert_eq!(channels.blocked_channels(), vec![ChannelId(1), ChannelId(2)]);

        assert!(channels.unblock_channel(ChannelId(2)));
        assert!(!channels.unblock_channel(ChannelId(2)));
        assert!(!channels.is_blocked(ChannelId(2)));
        assert_eq!(channels.blocked_count(), 1);
    }
}

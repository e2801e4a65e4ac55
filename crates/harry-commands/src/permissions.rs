//! Permission system for Harry's admin commands

use harry_common::{GuildId, UserId};
use harry_config::Config;
use harry_fun::{Authorizer, Caller};
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::{debug, info};

/// Bot admin list.
///
/// Members holding the Discord Administrator permission are always admins;
/// this list grants the same rights to additional users. It is seeded from
/// configuration and can be changed at runtime with `/admin add|remove`.
#[derive(Debug, Default)]
pub struct AdminManager {
    admins: RwLock<HashSet<UserId>>,
}

impl AdminManager {
    /// Create a new admin manager from configuration
    pub fn new(config: &Config) -> Self {
        Self::from_ids(config.discord.admin_ids.iter().copied().map(UserId))
    }

    /// Create an admin manager from a set of user ids
    pub fn from_ids(ids: impl IntoIterator<Item = UserId>) -> Self {
        let admins: HashSet<UserId> = ids.into_iter().collect();
        info!("Loaded {} bot admins", admins.len());
        Self {
            admins: RwLock::new(admins),
        }
    }

    /// Check if a user is on the bot admin list
    pub fn is_bot_admin(&self, user_id: UserId) -> bool {
        self.admins.read().contains(&user_id)
    }

    /// Add a bot admin. Returns `false` if they already were one.
    pub fn add_admin(&self, user_id: UserId) -> bool {
        let added = self.admins.write().insert(user_id);
        if added {
            info!("Added bot admin {}", user_id);
        }
        added
    }

    /// Remove a bot admin. Returns `false` if they weren't one.
    pub fn remove_admin(&self, user_id: UserId) -> bool {
        let removed = self.admins.write().remove(&user_id);
        if removed {
            info!("Removed bot admin {}", user_id);
        }
        removed
    }

    /// Bot admins, sorted by id
    pub fn admin_list(&self) -> Vec<UserId> {
        let mut admins: Vec<UserId> = self.admins.read().iter().copied().collect();
        admins.sort_unstable();
        admins
    }

    /// Number of bot admins
    pub fn admin_count(&self) -> usize {
        self.admins.read().len()
    }
}

impl Authorizer for AdminManager {
    fn is_admin(&self, caller: &Caller, guild: GuildId) -> bool {
        if caller.guild_administrator {
            debug!("User {} is an administrator of guild {}", caller.user_id, guild);
            return true;
        }
        self.is_bot_admin(caller.user_id)
    }
}

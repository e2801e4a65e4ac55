//! Per-guild target collections.

use dashmap::DashMap;
use harry_common::{GuildId, UserId};

use crate::target::Target;

/// Targets partitioned by guild, in insertion order within each guild.
///
/// Every read and write resolves the guild first, so targets in one guild
/// are invisible to every other guild. A guild's collection is created on
/// first write and kept, possibly empty, for the life of the store.
///
/// Closures passed to [`TargetStore::update`] run while the guild's shard
/// is locked, which makes each check-and-mutate atomic. They must not block.
#[derive(Debug, Default)]
pub struct TargetStore {
    guilds: DashMap<GuildId, Vec<Target>>,
}

impl TargetStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `target`, replacing an existing entry for the same user in
    /// place so it keeps its position.
    pub fn upsert(&self, target: Target) {
        let mut targets = self.guilds.entry(target.guild_id).or_default();
        match targets.iter_mut().find(|t| t.user_id == target.user_id) {
            Some(existing) => *existing = target,
            None => targets.push(target),
        }
    }

    /// Removes a target, returning it if it existed.
    pub fn remove(&self, guild: GuildId, user: UserId) -> Option<Target> {
        let mut targets = self.guilds.get_mut(&guild)?;
        let index = targets.iter().position(|t| t.user_id == user)?;
        Some(targets.remove(index))
    }

    /// Copy of a target.
    pub fn get(&self, guild: GuildId, user: UserId) -> Option<Target> {
        self.guilds
            .get(&guild)?
            .iter()
            .find(|t| t.user_id == user)
            .cloned()
    }

    /// Whether `user` is targeted in `guild`.
    pub fn contains(&self, guild: GuildId, user: UserId) -> bool {
        self.guilds
            .get(&guild)
            .is_some_and(|targets| targets.iter().any(|t| t.user_id == user))
    }

    /// Applies `f` to a target atomically. Returns `None` when the user is
    /// not targeted.
    pub fn update<R>(&self, guild: GuildId, user: UserId, f: impl FnOnce(&mut Target) -> R) -> Option<R> {
        let mut targets = self.guilds.get_mut(&guild)?;
        targets.iter_mut().find(|t| t.user_id == user).map(f)
    }

    /// All targets in `guild`, in insertion order.
    pub fn list(&self, guild: GuildId) -> Vec<Target> {
        self.guilds
            .get(&guild)
            .map(|targets| targets.clone())
            .unwrap_or_default()
    }

    /// Removes every target in `guild` and returns them.
    pub fn clear(&self, guild: GuildId) -> Vec<Target> {
        self.guilds
            .get_mut(&guild)
            .map(|mut targets| std::mem::take(&mut *targets))
            .unwrap_or_default()
    }

    /// Number of targets in `guild`.
    pub fn len(&self, guild: GuildId) -> usize {
        self.guilds.get(&guild).map_or(0, |targets| targets.len())
    }

    /// Whether `guild` has a collection, even an empty one.
    pub fn knows_guild(&self, guild: GuildId) -> bool {
        self.guilds.contains_key(&guild)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harry_common::test_utils::property_testing::{guild_id_strategy, user_id_strategy};
    use proptest::prelude::*;

    fn target(guild: u64, user: u64) -> Target {
        Target {
            user_id: UserId(user),
            guild_id: GuildId(guild),
            timeout_minutes: 30,
            last_triggered: None,
            engage: false,
            argument_count: 0,
            display_name: format!("user{user}"),
            enabled_by: UserId(999),
            enabled_by_name: "Admin".into(),
        }
    }

    #[test]
    fn test_insertion_order_and_in_place_upsert() {
        let store = TargetStore::new();
        store.upsert(target(1, 10));
        store.upsert(target(1, 20));
        store.upsert(target(1, 30));

        let mut replacement = target(1, 10);
        replacement.timeout_minutes = 5;
        store.upsert(replacement);

        let users: Vec<u64> = store.list(GuildId(1)).iter().map(|t| t.user_id.0).collect();
        assert_eq!(users, vec![10, 20, 30]);
        assert_eq!(store.get(GuildId(1), UserId(10)).unwrap().timeout_minutes, 5);
    }

    #[test]
    fn test_guilds_are_isolated() {
        let store = TargetStore::new();
        store.upsert(target(1, 10));
        assert!(store.contains(GuildId(1), UserId(10)));
        assert!(!store.contains(GuildId(2), UserId(10)));
        assert!(store.update(GuildId(2), UserId(10), |t| t.engage = true).is_none());
        assert!(store.remove(GuildId(2), UserId(10)).is_none());
    }

    #[test]
    fn test_clear_keeps_empty_collection() {
        let store = TargetStore::new();
        store.upsert(target(1, 10));
        store.upsert(target(1, 20));
        assert_eq!(store.clear(GuildId(1)).len(), 2);
        assert!(store.knows_guild(GuildId(1)));
        assert_eq!(store.len(GuildId(1)), 0);
        assert!(store.clear(GuildId(7)).is_empty());
        assert!(!store.knows_guild(GuildId(7)));
    }

    proptest! {
        #[test]
        fn prop_targets_never_leak_across_guilds(
            user in user_id_strategy(),
            home in guild_id_strategy(),
            other in guild_id_strategy(),
        ) {
            prop_assume!(home != other);
            let store = TargetStore::new();
            store.upsert(target(home.get(), user.get()));

            prop_assert!(store.contains(home, user));
            prop_assert!(!store.contains(other, user));
            prop_assert!(store.list(other).is_empty());
        }
    }
}

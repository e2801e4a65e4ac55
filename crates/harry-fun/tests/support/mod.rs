//! Deterministic collaborators for driving the tracker in tests.

#![allow(dead_code)]

use async_trait::async_trait;
use harry_common::test_utils::discord_fixtures::{test_admin_id, test_channel_id, test_guild_id, test_message_id};
use harry_common::{ChannelId, GuildId, MessageId, UserId};
use harry_fun::{
    Authorizer, Caller, Clock, Collaborators, EngagementSettings, EngagementTracker, FunError,
    FunResult, InboundMessage, MemberInfo, MemberResolver, RandomSource, ResolveError,
    TextGenerator, Transport,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: Duration) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Randomness with a fixed answer for `chance` and always the first pick.
#[derive(Debug, Default)]
pub struct FixedRandom {
    react: AtomicBool,
}

impl FixedRandom {
    pub fn set_react(&self, react: bool) {
        self.react.store(react, Ordering::SeqCst);
    }
}

impl RandomSource for FixedRandom {
    fn pick(&self, _len: usize) -> usize {
        0
    }

    fn chance(&self, _probability: f64) -> bool {
        self.react.load(Ordering::SeqCst)
    }
}

/// Transport that records everything and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    next_id: AtomicU64,
    fail: AtomicBool,
    pub sent: Mutex<Vec<(ChannelId, MessageId, String)>>,
    pub reactions: Mutex<Vec<(MessageId, String)>>,
}

impl RecordingTransport {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.lock().len()
    }

    /// Id of the most recent message sent.
    pub fn last_sent(&self) -> Option<MessageId> {
        self.sent.lock().last().map(|(_, id, _)| *id)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, channel: ChannelId, text: &str) -> FunResult<MessageId> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FunError::Transport("channel unavailable".into()));
        }
        let id = MessageId(500_000 + self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().push((channel, id, text.to_string()));
        Ok(id)
    }

    async fn add_reaction(&self, _channel: ChannelId, message: MessageId, emoji: &str) -> FunResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FunError::Transport("channel unavailable".into()));
        }
        self.reactions.lock().push((message, emoji.to_string()));
        Ok(())
    }
}

/// Grants or denies every admin check.
#[derive(Debug)]
pub struct StaticAuthorizer(pub bool);

impl Authorizer for StaticAuthorizer {
    fn is_admin(&self, _caller: &Caller, _guild: GuildId) -> bool {
        self.0
    }
}

/// Generator that always fails.
#[derive(Debug, Default)]
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> FunResult<String> {
        Err(FunError::Generation("service unavailable".into()))
    }
}

/// Resolver over a fixed member table.
#[derive(Debug, Default)]
pub struct TableResolver {
    pub members: HashMap<UserId, MemberInfo>,
}

impl TableResolver {
    pub fn with(mut self, user: UserId, name: &str, bot: bool) -> Self {
        self.members.insert(
            user,
            MemberInfo {
                user_id: user,
                display_name: name.to_string(),
                bot,
            },
        );
        self
    }
}

#[async_trait]
impl MemberResolver for TableResolver {
    async fn resolve_member(&self, _guild: GuildId, user: UserId) -> Result<MemberInfo, ResolveError> {
        match self.members.get(&user) {
            Some(member) if member.bot => Err(ResolveError::Bot {
                display_name: member.display_name.clone(),
            }),
            Some(member) => Ok(member.clone()),
            None => Err(ResolveError::NotFound),
        }
    }
}

/// A tracker wired to test doubles.
pub struct Harness {
    pub tracker: EngagementTracker,
    pub clock: Arc<ManualClock>,
    pub random: Arc<FixedRandom>,
    pub transport: RecordingTransport,
    next_message: AtomicU64,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(true, None)
    }

    pub fn unauthorized() -> Self {
        Self::build(false, None)
    }

    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self::build(true, Some(generator))
    }

    fn build(admin: bool, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        let clock = Arc::new(ManualClock::default());
        let random = Arc::new(FixedRandom::default());
        let tracker = EngagementTracker::new(
            EngagementSettings::default(),
            Collaborators {
                authorizer: Arc::new(StaticAuthorizer(admin)),
                clock: clock.clone(),
                random: random.clone(),
                generator,
            },
        )
        .expect("default settings are valid");

        Self {
            tracker,
            clock,
            random,
            transport: RecordingTransport::default(),
            next_message: AtomicU64::new(1),
        }
    }

    /// Adds `user` as a target in the default guild.
    pub fn target(&self, user: UserId, timeout_minutes: u32, engage: bool) {
        self.target_in(test_guild_id(), user, timeout_minutes, engage);
    }

    pub fn target_in(&self, guild: GuildId, user: UserId, timeout_minutes: u32, engage: bool) {
        self.tracker
            .add_target(&admin(), guild, &member(user), timeout_minutes, engage)
            .expect("add target");
    }

    /// A plain message from `user` in the default guild.
    pub fn message(&self, user: UserId, content: &str) -> InboundMessage {
        InboundMessage {
            id: test_message_id(self.next_message.fetch_add(1, Ordering::SeqCst)),
            guild_id: Some(test_guild_id()),
            channel_id: test_channel_id(),
            author_id: user,
            author_name: format!("user-{}", user.get() % 1000),
            author_is_bot: false,
            content: content.to_string(),
            reply_to: None,
            mentions_bot: false,
            in_blocked_channel: false,
        }
    }

    pub async fn send(&self, message: &InboundMessage) -> harry_fun::Outcome {
        self.tracker.handle_message(message, &self.transport).await
    }

    pub fn argument_count(&self, user: UserId) -> u8 {
        self.tracker
            .store()
            .get(test_guild_id(), user)
            .map_or(0, |t| t.argument_count)
    }
}

pub fn admin() -> Caller {
    Caller {
        user_id: test_admin_id(),
        display_name: "Admin".to_string(),
        guild_administrator: true,
    }
}

pub fn member(user: UserId) -> MemberInfo {
    MemberInfo {
        user_id: user,
        display_name: format!("user-{}", user.get() % 1000),
        bot: false,
    }
}

pub const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

//! The engagement tracker: target administration and message classification.

use harry_common::{sanitize_for_log, ChannelId, GuildId, MessageId, UserId};
use harry_config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classify::MessageMatcher;
use crate::comeback::ResponseGenerator;
use crate::error::{FunError, FunResult};
use crate::insult::TemplateGenerator;
use crate::pending::PendingResponses;
use crate::store::TargetStore;
use crate::target::{validate_timeout, Target};
use crate::traits::{
    Authorizer, Caller, Clock, MemberInfo, MemberResolver, RandomSource, ResolveError, TextGenerator,
    Transport,
};

/// Tunables taken from the `[fun]` and `[ai]` configuration sections.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementSettings {
    /// Word that summons Harry.
    pub trigger_word: String,
    /// Words that count as insulting Harry.
    pub insult_keywords: Vec<String>,
    /// Probability of reacting to a target's ordinary message.
    pub reaction_chance: f64,
    /// Emoji used for reactions.
    pub reaction_emojis: Vec<String>,
    /// Generated comebacks are cut to this many characters.
    pub max_comeback_chars: usize,
}

impl EngagementSettings {
    /// Extracts the tracker's settings from the bot configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            trigger_word: config.fun.trigger_word.clone(),
            insult_keywords: config.fun.insult_keywords.clone(),
            reaction_chance: config.fun.reaction_chance,
            reaction_emojis: config.fun.reaction_emojis.clone(),
            max_comeback_chars: config.ai.max_comeback_chars,
        }
    }
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Services the tracker calls out to.
#[derive(Clone)]
pub struct Collaborators {
    /// Decides who may manage targets.
    pub authorizer: Arc<dyn Authorizer>,
    /// Monotonic time.
    pub clock: Arc<dyn Clock>,
    /// Randomness for reactions and templates.
    pub random: Arc<dyn RandomSource>,
    /// Optional comeback generation; templates are used without it.
    pub generator: Option<Arc<dyn TextGenerator>>,
}

/// A guild message as the tracker sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The message id.
    pub id: MessageId,
    /// Guild it was posted in; `None` for direct messages.
    pub guild_id: Option<GuildId>,
    /// Channel it was posted in.
    pub channel_id: ChannelId,
    /// Author id.
    pub author_id: UserId,
    /// Author display name.
    pub author_name: String,
    /// Whether the author is a bot account.
    pub author_is_bot: bool,
    /// Message text.
    pub content: String,
    /// Message this one replies to, if any.
    pub reply_to: Option<MessageId>,
    /// Whether the bot user is mentioned.
    pub mentions_bot: bool,
    /// Whether the channel is on the block list.
    pub in_blocked_channel: bool,
}

/// What the tracker did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing applied.
    Ignored,
    /// A comeback answered a reply to one of Harry's messages.
    ReplyComeback,
    /// The target mentioned Harry and got an insult.
    MentionInsult,
    /// The target insulted Harry and got a comeback.
    InsultComeback,
    /// A comeback was due but the argument cap is reached.
    ArgumentCapReached,
    /// An organic troll fired.
    OrganicTroll {
        /// Whether a reaction was added too.
        reacted: bool,
    },
    /// The target is still inside their timeout.
    Cooldown {
        /// Whether a reaction was added.
        reacted: bool,
    },
    /// Unprompted responses are blocked in this channel.
    Suppressed,
    /// A response was due but sending it failed.
    SendFailed,
}

impl Outcome {
    /// Whether a message was sent.
    pub const fn sent(self) -> bool {
        matches!(
            self,
            Self::ReplyComeback | Self::MentionInsult | Self::InsultComeback | Self::OrganicTroll { .. }
        )
    }
}

/// Why a bulk add skipped a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a member of the guild.
    NotFound,
    /// A bot account.
    Bot,
}

/// A user left out of a bulk add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUser {
    /// The requested user.
    pub user_id: UserId,
    /// Display name when the member could be resolved.
    pub display_name: Option<String>,
    /// Why they were skipped.
    pub reason: SkipReason,
}

/// Result of [`EngagementTracker::bulk_add`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkAddReport {
    /// Targets created or replaced, in request order.
    pub added: Vec<Target>,
    /// Users that were skipped.
    pub skipped: Vec<SkippedUser>,
}

enum Reservation {
    Reserved(u8),
    Capped,
    Disengaged,
}

/// Per-guild engagement state and the rules that act on it.
///
/// Message handling never fails: transport and generation problems are
/// logged and reported through the returned [`Outcome`].
pub struct EngagementTracker {
    settings: EngagementSettings,
    matcher: MessageMatcher,
    store: TargetStore,
    pending: PendingResponses,
    responses: ResponseGenerator,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl std::fmt::Debug for EngagementTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementTracker")
            .field("settings", &self.settings)
            .field("store", &self.store)
            .field("responses", &self.responses)
            .finish_non_exhaustive()
    }
}

impl EngagementTracker {
    /// Creates a tracker with empty state.
    pub fn new(settings: EngagementSettings, collaborators: Collaborators) -> FunResult<Self> {
        let matcher = MessageMatcher::new(&settings.trigger_word, &settings.insult_keywords)
            .map_err(|e| FunError::Validation(format!("invalid trigger or insult keyword: {e}")))?;
        let responses = ResponseGenerator::new(
            collaborators.generator,
            TemplateGenerator::new(collaborators.random.clone()),
            settings.max_comeback_chars,
        );

        Ok(Self {
            settings,
            matcher,
            store: TargetStore::new(),
            pending: PendingResponses::new(),
            responses,
            authorizer: collaborators.authorizer,
            clock: collaborators.clock,
            random: collaborators.random,
        })
    }

    /// Current clock reading.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// The target collections.
    pub const fn store(&self) -> &TargetStore {
        &self.store
    }

    /// Automated messages awaiting a reply.
    pub const fn pending(&self) -> &PendingResponses {
        &self.pending
    }

    /// Whether comebacks come from the text generator.
    pub const fn ai_enabled(&self) -> bool {
        self.responses.ai_enabled()
    }

    fn authorize(&self, caller: &Caller, guild: GuildId) -> FunResult<()> {
        if self.authorizer.is_admin(caller, guild) {
            Ok(())
        } else {
            warn!("User {} tried to manage targets without permission", caller.user_id);
            Err(FunError::Unauthorized)
        }
    }

    fn new_target(caller: &Caller, guild: GuildId, member: &MemberInfo, timeout_minutes: u32, engage: bool) -> Target {
        Target {
            user_id: member.user_id,
            guild_id: guild,
            timeout_minutes,
            last_triggered: None,
            engage,
            argument_count: 0,
            display_name: member.display_name.clone(),
            enabled_by: caller.user_id,
            enabled_by_name: caller.display_name.clone(),
        }
    }

    /// Targets `member`, replacing and resetting any existing entry.
    pub fn add_target(
        &self,
        caller: &Caller,
        guild: GuildId,
        member: &MemberInfo,
        timeout_minutes: u32,
        engage: bool,
    ) -> FunResult<Target> {
        self.authorize(caller, guild)?;
        let timeout_minutes = validate_timeout(timeout_minutes)?;
        if member.bot {
            return Err(FunError::Validation("Can't target bots, mate!".into()));
        }

        let target = Self::new_target(caller, guild, member, timeout_minutes, engage);
        self.store.upsert(target.clone());
        info!(
            "{} targeted {} in guild {} (timeout {}m, engage {})",
            caller.display_name, member.display_name, guild, timeout_minutes, engage
        );
        Ok(target)
    }

    /// Stops targeting `user`. Returns whether they were targeted.
    pub fn remove_target(&self, caller: &Caller, guild: GuildId, user: UserId) -> FunResult<bool> {
        self.authorize(caller, guild)?;
        let removed = self.store.remove(guild, user);
        if let Some(target) = &removed {
            info!("{} untargeted {} in guild {}", caller.display_name, target.display_name, guild);
        }
        Ok(removed.is_some())
    }

    /// Changes a target's timeout and returns the previous one.
    pub fn set_timeout(&self, caller: &Caller, guild: GuildId, user: UserId, timeout_minutes: u32) -> FunResult<u32> {
        self.authorize(caller, guild)?;
        if !self.store.contains(guild, user) {
            return Err(FunError::NotFound { user_id: user });
        }
        let timeout_minutes = validate_timeout(timeout_minutes)?;

        let previous = self
            .store
            .update(guild, user, |t| std::mem::replace(&mut t.timeout_minutes, timeout_minutes))
            .ok_or(FunError::NotFound { user_id: user })?;
        info!(
            "Timeout for {} in guild {} changed from {}m to {}m",
            user, guild, previous, timeout_minutes
        );
        Ok(previous)
    }

    /// Flips engagement for a target, resets its argument count and returns
    /// the new setting.
    pub fn toggle_engage(&self, caller: &Caller, guild: GuildId, user: UserId) -> FunResult<bool> {
        self.authorize(caller, guild)?;
        let engage = self
            .store
            .update(guild, user, |t| {
                t.engage = !t.engage;
                t.argument_count = 0;
                t.engage
            })
            .ok_or(FunError::NotFound { user_id: user })?;
        info!("Engagement for {} in guild {} is now {}", user, guild, engage);
        Ok(engage)
    }

    /// All targets in `guild`, in the order they were added.
    pub fn list_targets(&self, caller: &Caller, guild: GuildId) -> FunResult<Vec<Target>> {
        self.authorize(caller, guild)?;
        Ok(self.store.list(guild))
    }

    /// Removes every target in `guild` and returns how many there were.
    pub fn clear_all(&self, caller: &Caller, guild: GuildId) -> FunResult<usize> {
        self.authorize(caller, guild)?;
        let removed = self.store.clear(guild).len();
        info!("{} cleared {} targets in guild {}", caller.display_name, removed, guild);
        Ok(removed)
    }

    /// Targets several users at once.
    ///
    /// The timeout is validated once up front. Users that cannot be
    /// resolved or are bots are skipped with a reason; the rest are added.
    pub async fn bulk_add(
        &self,
        caller: &Caller,
        guild: GuildId,
        users: &[UserId],
        timeout_minutes: u32,
        engage: bool,
        resolver: &dyn MemberResolver,
    ) -> FunResult<BulkAddReport> {
        self.authorize(caller, guild)?;
        let timeout_minutes = validate_timeout(timeout_minutes)?;

        let mut report = BulkAddReport::default();
        for &user_id in users {
            match resolver.resolve_member(guild, user_id).await {
                Ok(member) if member.bot => report.skipped.push(SkippedUser {
                    user_id,
                    display_name: Some(member.display_name),
                    reason: SkipReason::Bot,
                }),
                Ok(member) => {
                    let target = Self::new_target(caller, guild, &member, timeout_minutes, engage);
                    self.store.upsert(target.clone());
                    report.added.push(target);
                }
                Err(ResolveError::Bot { display_name }) => report.skipped.push(SkippedUser {
                    user_id,
                    display_name: Some(display_name),
                    reason: SkipReason::Bot,
                }),
                Err(ResolveError::NotFound) => report.skipped.push(SkippedUser {
                    user_id,
                    display_name: None,
                    reason: SkipReason::NotFound,
                }),
            }
        }

        info!(
            "{} bulk-targeted {} users in guild {} ({} skipped)",
            caller.display_name,
            report.added.len(),
            guild,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Decides on and performs at most one automated response to `message`.
    pub async fn handle_message(&self, message: &InboundMessage, transport: &dyn Transport) -> Outcome {
        if message.author_is_bot {
            return Outcome::Ignored;
        }
        let Some(guild) = message.guild_id else {
            return Outcome::Ignored;
        };

        if let Some(reference) = message.reply_to {
            return self.handle_reply(message, guild, reference, transport).await;
        }

        let Some(target) = self.store.get(guild, message.author_id) else {
            return Outcome::Ignored;
        };

        if message.mentions_bot || self.matcher.mentions_trigger(&message.content) {
            debug!(
                "Target {} summoned Harry: {}",
                message.author_name,
                sanitize_for_log(&message.content)
            );
            let text = self.responses.insult(&message.author_id.mention());
            return match self.send(message.channel_id, &text, transport).await {
                Some(sent) => {
                    self.track_if_engaged(sent, guild, message.author_id);
                    Outcome::MentionInsult
                }
                None => Outcome::SendFailed,
            };
        }

        if message.in_blocked_channel {
            debug!("Channel {} is blocked, not trolling {}", message.channel_id, message.author_name);
            return Outcome::Suppressed;
        }

        if target.engage && self.matcher.contains_insult(&message.content) {
            return match self.reserve_argument(guild, message.author_id) {
                Some(Reservation::Reserved(count)) => {
                    debug!("Arguing back with {} (count: {})", message.author_name, count);
                    self.send_comeback(message, guild, transport, Outcome::InsultComeback)
                        .await
                }
                Some(Reservation::Capped) => {
                    info!("Argument limit reached for {}", message.author_name);
                    Outcome::ArgumentCapReached
                }
                Some(Reservation::Disengaged) | None => Outcome::Ignored,
            };
        }

        self.organic_troll(message, guild, transport).await
    }

    async fn handle_reply(
        &self,
        message: &InboundMessage,
        guild: GuildId,
        reference: MessageId,
        transport: &dyn Transport,
    ) -> Outcome {
        let Some(pending) = self.pending.lookup(reference) else {
            return Outcome::Ignored;
        };
        if pending.guild_id != guild || pending.user_id != message.author_id {
            return Outcome::Ignored;
        }

        match self.reserve_argument(guild, message.author_id) {
            Some(Reservation::Reserved(count)) => {
                debug!(
                    "{} replied to Harry (count: {}): {}",
                    message.author_name,
                    count,
                    sanitize_for_log(&message.content)
                );
                self.send_comeback(message, guild, transport, Outcome::ReplyComeback)
                    .await
            }
            Some(Reservation::Capped) => {
                info!("Argument limit reached for {}", message.author_name);
                Outcome::ArgumentCapReached
            }
            Some(Reservation::Disengaged) | None => Outcome::Ignored,
        }
    }

    async fn organic_troll(&self, message: &InboundMessage, guild: GuildId, transport: &dyn Transport) -> Outcome {
        let reacted = self.maybe_react(message, transport).await;

        let now = self.clock.now();
        let claimed = self
            .store
            .update(guild, message.author_id, |t| {
                t.is_due(now).then(|| std::mem::replace(&mut t.last_triggered, Some(now)))
            })
            .flatten();
        let Some(previous) = claimed else {
            return Outcome::Cooldown { reacted };
        };

        let text = self.responses.insult(&message.author_id.mention());
        if let Some(sent) = self.send(message.channel_id, &text, transport).await {
            info!("Trolled {} in guild {}", message.author_name, guild);
            self.track_if_engaged(sent, guild, message.author_id);
            Outcome::OrganicTroll { reacted }
        } else {
            self.store.update(guild, message.author_id, |t| {
                if t.last_triggered == Some(now) {
                    t.last_triggered = previous;
                }
            });
            Outcome::SendFailed
        }
    }

    async fn maybe_react(&self, message: &InboundMessage, transport: &dyn Transport) -> bool {
        let emojis = &self.settings.reaction_emojis;
        if emojis.is_empty() || !self.random.chance(self.settings.reaction_chance) {
            return false;
        }
        let emoji = &emojis[self.random.pick(emojis.len()).min(emojis.len() - 1)];
        match transport.add_reaction(message.channel_id, message.id, emoji).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to react to message {}: {}", message.id, e);
                false
            }
        }
    }

    /// Takes one argument slot for a comeback, if engagement is on and the
    /// cap is not reached.
    fn reserve_argument(&self, guild: GuildId, user: UserId) -> Option<Reservation> {
        self.store.update(guild, user, |t| {
            if !t.engage {
                Reservation::Disengaged
            } else if t.at_argument_cap() {
                Reservation::Capped
            } else {
                t.argument_count += 1;
                Reservation::Reserved(t.argument_count)
            }
        })
    }

    async fn send_comeback(
        &self,
        message: &InboundMessage,
        guild: GuildId,
        transport: &dyn Transport,
        outcome: Outcome,
    ) -> Outcome {
        let text = self
            .responses
            .comeback(&message.author_name, &message.content)
            .await;
        if let Some(sent) = self.send(message.channel_id, &text, transport).await {
            self.track_if_engaged(sent, guild, message.author_id);
            outcome
        } else {
            self.store.update(guild, message.author_id, |t| {
                t.argument_count = t.argument_count.saturating_sub(1);
            });
            Outcome::SendFailed
        }
    }

    async fn send(&self, channel: ChannelId, text: &str, transport: &dyn Transport) -> Option<MessageId> {
        match transport.send_message(channel, text).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Failed to send message to channel {}: {}", channel, e);
                None
            }
        }
    }

    fn track_if_engaged(&self, sent: MessageId, guild: GuildId, user: UserId) {
        let engaged = self.store.get(guild, user).is_some_and(|t| t.engage);
        if engaged {
            self.pending.record(sent, guild, user);
        }
    }
}

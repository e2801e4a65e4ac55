//! Serenity-backed implementations of the tracker's collaborators.

use async_trait::async_trait;
use harry_common::{ChannelId, GuildId, MessageId, UserId};
use harry_fun::{FunError, FunResult, MemberInfo, MemberResolver, ResolveError, Transport};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::debug;

/// Converts a tracker id into its serenity counterpart.
pub fn to_serenity_channel(channel: ChannelId) -> serenity::ChannelId {
    serenity::ChannelId::new(channel.get())
}

/// Converts a serenity guild id into the tracker's id.
pub fn from_serenity_guild(guild: serenity::GuildId) -> GuildId {
    GuildId(guild.get())
}

/// Converts a serenity user id into the tracker's id.
pub fn from_serenity_user(user: serenity::UserId) -> UserId {
    UserId(user.get())
}

/// Sends through the Discord REST API.
#[derive(Clone)]
pub struct SerenityTransport {
    http: Arc<serenity::Http>,
}

impl SerenityTransport {
    /// Wraps a serenity HTTP client.
    pub const fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for SerenityTransport {
    async fn send_message(&self, channel: ChannelId, text: &str) -> FunResult<MessageId> {
        let builder = serenity::CreateMessage::new().content(text);
        let sent = to_serenity_channel(channel)
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| FunError::Transport(e.to_string()))?;
        Ok(MessageId(sent.id.get()))
    }

    async fn add_reaction(&self, channel: ChannelId, message: MessageId, emoji: &str) -> FunResult<()> {
        let reaction = serenity::ReactionType::Unicode(emoji.to_string());
        self.http
            .create_reaction(
                to_serenity_channel(channel),
                serenity::MessageId::new(message.get()),
                &reaction,
            )
            .await
            .map_err(|e| FunError::Transport(e.to_string()))
    }
}

/// Resolves guild members through the Discord REST API.
#[derive(Clone)]
pub struct SerenityMemberResolver {
    http: Arc<serenity::Http>,
}

impl SerenityMemberResolver {
    /// Wraps a serenity HTTP client.
    pub const fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MemberResolver for SerenityMemberResolver {
    async fn resolve_member(&self, guild: GuildId, user: UserId) -> Result<MemberInfo, ResolveError> {
        let member = self
            .http
            .get_member(serenity::GuildId::new(guild.get()), serenity::UserId::new(user.get()))
            .await
            .map_err(|e| {
                debug!("Could not fetch member {} in guild {}: {}", user, guild, e);
                ResolveError::NotFound
            })?;

        Ok(MemberInfo {
            user_id: user,
            display_name: member.display_name().to_string(),
            bot: member.user.bot,
        })
    }
}

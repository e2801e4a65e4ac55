//! Command context helpers and metrics integration

use harry_common::GuildId;
use harry_fun::Caller;
use poise::serenity_prelude as serenity;
use std::time::Instant;
use tracing::debug;

use crate::framework::{Context, Error};
use crate::transport::{from_serenity_guild, from_serenity_user};

/// Record a command's execution time
///
/// Failures are counted by the framework's error hook, so only the timing
/// is recorded here.
pub fn record_command_execution(
    ctx: &Context<'_>,
    command_name: &str,
    start_time: Instant,
    result: &Result<(), Error>,
) {
    let duration = start_time.elapsed();
    ctx.data().metrics.record_command(command_name, duration);
    debug!(
        "Command {} by {} finished in {:?} (ok: {})",
        command_name,
        ctx.author().id,
        duration,
        result.is_ok()
    );
}

/// Macro to wrap command execution with automatic metrics recording
#[macro_export]
macro_rules! with_metrics {
    ($ctx:expr, $command_name:expr, $body:expr) => {{
        let start_time = std::time::Instant::now();
        let result: Result<(), $crate::framework::Error> = $body.await;
        $crate::context::record_command_execution(&$ctx, $command_name, start_time, &result);
        result
    }};
}

/// The invoking user as the tracker's authorizer sees them
pub async fn caller(ctx: Context<'_>) -> Caller {
    let member = ctx.author_member().await;
    let guild_administrator = member
        .as_ref()
        .and_then(|m| m.permissions)
        .is_some_and(|p| p.administrator());
    let display_name = member.as_ref().map_or_else(
        || ctx.author().display_name().to_string(),
        |m| m.display_name().to_string(),
    );

    Caller {
        user_id: from_serenity_user(ctx.author().id),
        display_name,
        guild_administrator,
    }
}

/// The guild a command was invoked in
pub fn guild_of(ctx: Context<'_>) -> Option<GuildId> {
    ctx.guild_id().map(from_serenity_guild)
}

/// Send an ephemeral embed reply
pub async fn reply_embed(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Send an ephemeral text reply
pub async fn reply_text(ctx: Context<'_>, text: impl Into<String>) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

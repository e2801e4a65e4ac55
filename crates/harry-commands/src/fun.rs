//! `/fun` commands for managing engagement targets.
//!
//! Every reply is ephemeral so targets never see that they are targeted.

use harry_common::sanitize_for_log;
use harry_fun::{parse_mentions, BulkAddReport, FunError, FunResult, MemberInfo, SkipReason, Target, MAX_ARGUMENTS};
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::debug;

use crate::context::{caller, guild_of, reply_embed, reply_text};
use crate::framework::{Context, Error};
use crate::transport::{from_serenity_user, SerenityMemberResolver};
use crate::with_metrics;

const TARGET_COLOR: u32 = 0xff6b6b;
const RELEASED_COLOR: u32 = 0x00ff00;
const ENGAGED_COLOR: u32 = 0xff0000;
const DISENGAGED_COLOR: u32 = 0x808080;
const PRIMARY_COLOR: u32 = 0x5865f2;
const WARNING_COLOR: u32 = 0xfee75c;

const GUILD_ONLY: &str = "❌ This command only works in servers!";
const STATUS_FOOTER: &str = "This is completely hidden from targets | Harry's Secret Trolling System";
/// Released users are only listed up to this many.
const MAX_RELEASED_LISTED: usize = 10;

/// Secret fun commands (Admin only)
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "target",
        "untarget",
        "timeout",
        "toggle_engage",
        "status",
        "target_all",
        "untarget_all"
    ),
    subcommand_required
)]
pub async fn fun(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// 🎯 Start trolling a user (Admin only)
#[poise::command(slash_command, guild_only)]
pub async fn target(
    ctx: Context<'_>,
    #[description = "The user to troll"] user: serenity::Member,
    #[description = "Minutes between automatic responses (default 30)"] timeout: Option<u32>,
    #[description = "Argue back when they respond (default off)"] engage: Option<bool>,
) -> Result<(), Error> {
    with_metrics!(ctx, "fun target", async move {
        let Some(guild) = guild_of(ctx) else {
            return reply_text(ctx, GUILD_ONLY).await;
        };
        let caller = caller(ctx).await;
        let timeout = timeout.unwrap_or(ctx.data().config.fun.default_timeout_minutes);
        let engage = engage.unwrap_or(false);

        let result = ctx
            .data()
            .tracker
            .add_target(&caller, guild, &member_info(&user), timeout, engage);
        if let Some(target) = accept(ctx, result, user.display_name()).await? {
            reply_embed(ctx, target_embed(&target)).await?;
        }
        Ok(())
    })
}

/// 🛑 Stop trolling a user (Admin only)
#[poise::command(slash_command, guild_only)]
pub async fn untarget(
    ctx: Context<'_>,
    #[description = "The user to stop trolling"] user: serenity::Member,
) -> Result<(), Error> {
    with_metrics!(ctx, "fun untarget", async move {
        let Some(guild) = guild_of(ctx) else {
            return reply_text(ctx, GUILD_ONLY).await;
        };
        let caller = caller(ctx).await;
        let result = ctx
            .data()
            .tracker
            .remove_target(&caller, guild, from_serenity_user(user.user.id));

        match accept(ctx, result, user.display_name()).await? {
            Some(true) => {
                let embed = serenity::CreateEmbed::new()
                    .title("🛑 Target Released")
                    .description(format!(
                        "**{}** is no longer being trolled.\n\nThey can live in peace... for now.",
                        user.display_name()
                    ))
                    .color(RELEASED_COLOR);
                reply_embed(ctx, embed).await
            }
            Some(false) => {
                reply_text(ctx, format!("❌ {} isn't being targeted!", user.display_name())).await
            }
            None => Ok(()),
        }
    })
}

/// ⏱️ Adjust timeout for a user (Admin only)
#[poise::command(slash_command, guild_only)]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The targeted user"] user: serenity::Member,
    #[description = "New timeout in minutes"] minutes: u32,
) -> Result<(), Error> {
    with_metrics!(ctx, "fun timeout", async move {
        let Some(guild) = guild_of(ctx) else {
            return reply_text(ctx, GUILD_ONLY).await;
        };
        let caller = caller(ctx).await;
        let result = ctx
            .data()
            .tracker
            .set_timeout(&caller, guild, from_serenity_user(user.user.id), minutes);

        if let Some(previous) = accept(ctx, result, user.display_name()).await? {
            let embed = serenity::CreateEmbed::new()
                .title("⏱️ Timeout Adjusted")
                .description(format!(
                    "**{}**'s timeout updated:\n\n**{previous} minutes** → **{minutes} minutes**",
                    user.display_name()
                ))
                .color(PRIMARY_COLOR);
            reply_embed(ctx, embed).await?;
        }
        Ok(())
    })
}

/// 🔥 Toggle argument mode for a user (Admin only)
#[poise::command(slash_command, guild_only)]
pub async fn toggle_engage(
    ctx: Context<'_>,
    #[description = "The targeted user"] user: serenity::Member,
) -> Result<(), Error> {
    with_metrics!(ctx, "fun toggle_engage", async move {
        let Some(guild) = guild_of(ctx) else {
            return reply_text(ctx, GUILD_ONLY).await;
        };
        let caller = caller(ctx).await;
        let result = ctx
            .data()
            .tracker
            .toggle_engage(&caller, guild, from_serenity_user(user.user.id));

        if let Some(engaged) = accept(ctx, result, user.display_name()).await? {
            reply_embed(ctx, engage_embed(user.display_name(), engaged)).await?;
        }
        Ok(())
    })
}

/// 📋 Check trolling status (Admin only)
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    with_metrics!(ctx, "fun status", async move {
        let Some(guild) = guild_of(ctx) else {
            return reply_text(ctx, GUILD_ONLY).await;
        };
        let caller = caller(ctx).await;
        let tracker = &ctx.data().tracker;
        let result = tracker.list_targets(&caller, guild);

        if let Some(targets) = accept(ctx, result, "").await? {
            reply_embed(ctx, status_embed(&targets, tracker.now())).await?;
        }
        Ok(())
    })
}

/// 🎯 Start trolling multiple users at once (Admin only)
#[poise::command(slash_command, guild_only)]
pub async fn target_all(
    ctx: Context<'_>,
    #[description = "Mention the users to troll, e.g. @user1 @user2"] users: String,
    #[description = "Minutes between automatic responses (default 30)"] timeout: Option<u32>,
    #[description = "Argue back when they respond (default off)"] engage: Option<bool>,
) -> Result<(), Error> {
    with_metrics!(ctx, "fun target_all", async move {
        let Some(guild) = guild_of(ctx) else {
            return reply_text(ctx, GUILD_ONLY).await;
        };
        let caller = caller(ctx).await;
        let timeout = timeout.unwrap_or(ctx.data().config.fun.default_timeout_minutes);
        let engage = engage.unwrap_or(false);

        let mentioned = parse_mentions(&users);
        debug!(
            "target_all with {} mentions from {}",
            mentioned.len(),
            sanitize_for_log(&users)
        );
        if mentioned.is_empty() {
            return reply_text(
                ctx,
                "❌ No valid user mentions found!\n\n\
                 **Usage:** `/fun target_all users:@user1 @user2 @user3 timeout:30`",
            )
            .await;
        }

        let resolver = SerenityMemberResolver::new(ctx.serenity_context().http.clone());
        let result = ctx
            .data()
            .tracker
            .bulk_add(&caller, guild, &mentioned, timeout, engage, &resolver)
            .await;

        if let Some(report) = accept(ctx, result, "").await? {
            if report.added.is_empty() {
                return reply_text(ctx, nothing_added_text(&report)).await;
            }
            reply_embed(ctx, bulk_embed(&report, timeout, engage)).await?;
        }
        Ok(())
    })
}

/// 🛑 Stop trolling ALL users (Admin only)
#[poise::command(slash_command, guild_only)]
pub async fn untarget_all(ctx: Context<'_>) -> Result<(), Error> {
    with_metrics!(ctx, "fun untarget_all", async move {
        let Some(guild) = guild_of(ctx) else {
            return reply_text(ctx, GUILD_ONLY).await;
        };
        let caller = caller(ctx).await;
        let tracker = &ctx.data().tracker;

        let Some(targets) = accept(ctx, tracker.list_targets(&caller, guild), "").await? else {
            return Ok(());
        };
        let Some(count) = accept(ctx, tracker.clear_all(&caller, guild), "").await? else {
            return Ok(());
        };
        if count == 0 {
            return reply_text(ctx, "❌ No active targets to remove!").await;
        }

        let names: Vec<&str> = targets.iter().map(|t| t.display_name.as_str()).collect();
        reply_embed(ctx, released_all_embed(count, &names)).await
    })
}

/// Passes successful results through and answers the admin for rejections.
///
/// Returns `Ok(None)` once a rejection has been sent. Errors that are not
/// meant for the admin propagate to the framework's error hook.
async fn accept<T>(ctx: Context<'_>, result: FunResult<T>, user_name: &str) -> Result<Option<T>, Error> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => match rejection_text(&err, user_name) {
            Some(text) => {
                reply_text(ctx, text).await?;
                Ok(None)
            }
            None => Err(err.into()),
        },
    }
}

/// The message an admin sees when an operation is refused.
pub fn rejection_text(err: &FunError, user_name: &str) -> Option<String> {
    match err {
        FunError::Unauthorized => Some("❌ Nice try, but no.".to_string()),
        FunError::NotFound { .. } => Some(format!(
            "❌ {user_name} isn't being targeted! Use `/fun target` first."
        )),
        FunError::Validation(message) => Some(format!("❌ {message}")),
        FunError::Transport(_) | FunError::Generation(_) => None,
    }
}

/// Tracker view of a guild member.
pub fn member_info(member: &serenity::Member) -> MemberInfo {
    MemberInfo {
        user_id: from_serenity_user(member.user.id),
        display_name: member.display_name().to_string(),
        bot: member.user.bot,
    }
}

fn engage_line(engage: bool) -> &'static str {
    if engage {
        "🔥 **Engage mode: ON** - Harry will argue if they respond!"
    } else {
        "💤 **Engage mode: OFF**"
    }
}

/// Description of the confirmation sent after `/fun target`.
pub fn target_description(target: &Target) -> String {
    format!(
        "**{}** is now being trolled!\n\n\
         ⏱️ **Timeout:** {} minutes\n\
         {}\n\
         🤫 **Silent mode:** They won't know it's intentional\n\n\
         Harry will respond to their messages with creative greetings.",
        target.display_name,
        target.timeout_minutes,
        engage_line(target.engage)
    )
}

fn target_embed(target: &Target) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🎯 Target Acquired")
        .description(target_description(target))
        .color(TARGET_COLOR)
        .footer(serenity::CreateEmbedFooter::new(
            "Use /fun toggle_engage to change | /fun status to check",
        ))
}

fn engage_embed(user_name: &str, engaged: bool) -> serenity::CreateEmbed {
    let (title, state, detail, color) = if engaged {
        (
            "🔥 Engage Mode Activated",
            "ON - Harry will argue back!",
            "Harry will now generate contextual comebacks when they reply!",
            ENGAGED_COLOR,
        )
    } else {
        (
            "💤 Engage Mode Deactivated",
            "OFF - No arguments",
            "Harry will ignore their responses.",
            DISENGAGED_COLOR,
        )
    };

    serenity::CreateEmbed::new()
        .title(title)
        .description(format!("**{user_name}** engage mode: **{state}**\n\n{detail}"))
        .color(color)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Argument counter reset to 0 | Max {MAX_ARGUMENTS} arguments per user"
        )))
}

fn whole_minutes(duration: Duration) -> u64 {
    duration.as_secs() / 60
}

/// One `/fun status` field for a target, as of `now`.
pub fn status_field(target: &Target, now: Duration) -> (String, String) {
    let last = target
        .since_triggered(now)
        .map_or_else(|| "never".to_string(), |since| format!("{}m ago", whole_minutes(since)));
    let next = whole_minutes(target.next_available_in(now));
    let engage = if target.engage { "🔥 ON" } else { "💤 OFF" };

    let value = format!(
        "⏱️ **Timeout:** {} minutes\n\
         🕐 **Last triggered:** {last}\n\
         ⏳ **Next available:** {next}m\n\
         🔥 **Engage mode:** {engage}\n\
         💬 **Arguments:** {}/{MAX_ARGUMENTS}\n\
         👤 **Enabled by:** {}",
        target.timeout_minutes, target.argument_count, target.enabled_by_name
    );
    (format!("🎯 {}", target.display_name), value)
}

fn status_embed(targets: &[Target], now: Duration) -> serenity::CreateEmbed {
    let embed = if targets.is_empty() {
        serenity::CreateEmbed::new()
            .title("📋 Trolling Status")
            .description("No active targets.\n\nUse `/fun target` to start trolling someone!")
            .color(WARNING_COLOR)
    } else {
        let fields = targets.iter().map(|t| {
            let (name, value) = status_field(t, now);
            (name, value, false)
        });
        serenity::CreateEmbed::new()
            .title("📋 Active Targets")
            .description(format!("Currently trolling **{}** user(s):", targets.len()))
            .color(TARGET_COLOR)
            .fields(fields)
    };
    embed.footer(serenity::CreateEmbedFooter::new(STATUS_FOOTER))
}

/// Bullet label for a skipped user.
pub fn skipped_label(skipped: &harry_fun::SkippedUser) -> String {
    match (&skipped.display_name, skipped.reason) {
        (Some(name), SkipReason::Bot) => format!("{name} (bot)"),
        (None, SkipReason::Bot) => format!("<@{}> (bot)", skipped.user_id),
        (_, SkipReason::NotFound) => format!("<@{}> (not found)", skipped.user_id),
    }
}

fn bullets<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| format!("• {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reply when a bulk add resolved nobody.
pub fn nothing_added_text(report: &BulkAddReport) -> String {
    let mut text = String::from("❌ No users were added!\n\n");
    if !report.skipped.is_empty() {
        let skipped: Vec<String> = report.skipped.iter().map(skipped_label).collect();
        text.push_str(&format!("**Skipped:** {}", skipped.join(", ")));
    }
    text
}

fn bulk_embed(report: &BulkAddReport, timeout: u32, engage: bool) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("🎯 Multiple Targets Acquired")
        .description(format!(
            "**{} users** are now being trolled!\n\n\
             ⏱️ **Timeout:** {timeout} minutes\n\
             {}\n\
             🤫 **Silent mode:** They won't know it's intentional",
            report.added.len(),
            engage_line(engage)
        ))
        .color(TARGET_COLOR)
        .field(
            "✅ Added",
            bullets(report.added.iter().map(|t| t.display_name.as_str())),
            false,
        );

    if !report.skipped.is_empty() {
        embed = embed.field(
            "⏭️ Skipped",
            bullets(report.skipped.iter().map(skipped_label)),
            false,
        );
    }
    embed.footer(serenity::CreateEmbedFooter::new(
        "Use /fun untarget to stop | /fun status to check",
    ))
}

fn released_all_embed(count: usize, names: &[&str]) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .title("🛑 All Targets Released")
        .description(format!(
            "Removed **{count} users** from trolling list.\n\nThey can all live in peace... for now."
        ))
        .color(RELEASED_COLOR);

    if names.is_empty() || names.len() > MAX_RELEASED_LISTED {
        embed
    } else {
        embed.field("Released Users", bullets(names), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harry_common::{GuildId, UserId};
    use harry_fun::SkippedUser;
    use proptest::prelude::*;

    fn target() -> Target {
        Target {
            user_id: UserId(10),
            guild_id: GuildId(1),
            timeout_minutes: 30,
            last_triggered: None,
            engage: true,
            argument_count: 2,
            display_name: "Dave".to_string(),
            enabled_by: UserId(2),
            enabled_by_name: "Mod".to_string(),
        }
    }

    #[test]
    fn test_rejection_texts() {
        assert_eq!(
            rejection_text(&FunError::Unauthorized, "Dave").as_deref(),
            Some("❌ Nice try, but no.")
        );
        assert_eq!(
            rejection_text(&FunError::NotFound { user_id: UserId(10) }, "Dave").as_deref(),
            Some("❌ Dave isn't being targeted! Use `/fun target` first.")
        );
        assert_eq!(
            rejection_text(&FunError::Validation("Can't target bots, mate!".into()), "Dave").as_deref(),
            Some("❌ Can't target bots, mate!")
        );
        assert!(rejection_text(&FunError::Transport("down".into()), "Dave").is_none());
    }

    #[test]
    fn test_target_description_mentions_settings() {
        let description = target_description(&target());
        assert!(description.starts_with("**Dave** is now being trolled!"));
        assert!(description.contains("**Timeout:** 30 minutes"));
        assert!(description.contains("Engage mode: ON"));
    }

    #[test]
    fn test_status_field_for_untriggered_target() {
        let (name, value) = status_field(&target(), Duration::from_secs(600));
        assert_eq!(name, "🎯 Dave");
        assert!(value.contains("**Last triggered:** never"));
        assert!(value.contains("**Next available:** 0m"));
        assert!(value.contains("**Arguments:** 2/5"));
        assert!(value.contains("**Enabled by:** Mod"));
    }

    #[test]
    fn test_status_field_counts_down() {
        let mut target = target();
        target.last_triggered = Some(Duration::from_secs(60));
        let (_, value) = status_field(&target, Duration::from_secs(60 + 10 * 60));
        assert!(value.contains("**Last triggered:** 10m ago"));
        assert!(value.contains("**Next available:** 20m"));
    }

    #[test]
    fn test_skipped_labels() {
        let not_found = SkippedUser {
            user_id: UserId(5),
            display_name: None,
            reason: SkipReason::NotFound,
        };
        let bot = SkippedUser {
            user_id: UserId(6),
            display_name: Some("Botty".to_string()),
            reason: SkipReason::Bot,
        };
        assert_eq!(skipped_label(&not_found), "<@5> (not found)");
        assert_eq!(skipped_label(&bot), "Botty (bot)");

        let report = BulkAddReport {
            added: Vec::new(),
            skipped: vec![not_found, bot],
        };
        assert_eq!(
            nothing_added_text(&report),
            "❌ No users were added!\n\n**Skipped:** <@5> (not found), Botty (bot)"
        );
    }

    #[test]
    fn test_bullets() {
        assert_eq!(bullets(["a", "b"]), "• a\n• b");
    }

    proptest! {
        #[test]
        fn prop_next_available_never_exceeds_timeout(timeout in 1u32..=1440, last in 0u64..100_000, elapsed in 0u64..200_000) {
            let mut target = target();
            target.timeout_minutes = timeout;
            target.last_triggered = Some(Duration::from_secs(last));
            let (_, value) = status_field(&target, Duration::from_secs(last + elapsed));

            let next = value
                .lines()
                .find_map(|line| line.strip_prefix("⏳ **Next available:** "))
                .and_then(|rest| rest.trim_end_matches('m').parse::<u32>().ok())
                .expect("next available line");
            prop_assert!(next <= timeout);
        }
    }
}

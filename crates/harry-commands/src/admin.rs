//! `/admin` commands: bot admins, blocked channels, budget, AI usage and metrics.

use harry_common::{format_duration_secs, ChannelId, UserId};
use harry_fun::Authorizer;
use harry_monitoring::{budget_indicator, progress_bar, BudgetStatus, CostCategory, MetricsSnapshot, SlowCommand};
use poise::serenity_prelude as serenity;

use crate::context::{caller, guild_of, reply_embed, reply_text};
use crate::framework::{Context, Error};
use crate::transport::from_serenity_user;
use crate::with_metrics;

const SUCCESS_COLOR: u32 = 0x57f287;
const INFO_COLOR: u32 = 0x5865f2;
const WARNING_COLOR: u32 = 0xfee75c;

/// Commands listed in the metrics summary.
const SLOWEST_LISTED: usize = 5;

/// 🔧 Admin commands for managing Harry
#[poise::command(
    slash_command,
    subcommands(
        "add", "remove", "list", "block", "unblock", "blocked", "budget", "ai", "metrics"
    ),
    subcommand_required
)]
pub async fn admin(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Checks the invoker may use admin commands, answering with `denial` if not.
async fn require_admin(ctx: Context<'_>, denial: &str) -> Result<bool, Error> {
    let caller = caller(ctx).await;
    let admins = &ctx.data().admins;
    let allowed = guild_of(ctx).map_or_else(
        || admins.is_bot_admin(caller.user_id),
        |guild| admins.is_admin(&caller, guild),
    );
    if allowed {
        return Ok(true);
    }
    reply_text(ctx, denial).await?;
    Ok(false)
}

fn info_embed(title: &str, description: String, color: u32) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(color)
}

/// Add a user as bot admin
#[poise::command(slash_command)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "The user to make a bot admin"] user: serenity::User,
) -> Result<(), Error> {
    with_metrics!(ctx, "admin add", async move {
        if !require_admin(ctx, "❌ You need to be a bot admin!").await? {
            return Ok(());
        }
        let name = user.display_name();
        let embed = if ctx.data().admins.add_admin(from_serenity_user(user.id)) {
            info_embed("✅ Bot Admin Added!", format!("**{name}** is now a bot admin!"), SUCCESS_COLOR)
        } else {
            info_embed("ℹ️ Already an Admin", format!("{name} is already a bot admin!"), INFO_COLOR)
        };
        reply_embed(ctx, embed).await
    })
}

/// Remove a user as bot admin
#[poise::command(slash_command)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "The user to remove as bot admin"] user: serenity::User,
) -> Result<(), Error> {
    with_metrics!(ctx, "admin remove", async move {
        if !require_admin(ctx, "❌ You need to be a bot admin!").await? {
            return Ok(());
        }
        let name = user.display_name();
        let embed = if ctx.data().admins.remove_admin(from_serenity_user(user.id)) {
            info_embed(
                "✅ Bot Admin Removed",
                format!("**{name}** is no longer a bot admin."),
                SUCCESS_COLOR,
            )
        } else {
            info_embed("ℹ️ Not an Admin", format!("{name} isn't a bot admin!"), INFO_COLOR)
        };
        reply_embed(ctx, embed).await
    })
}

/// List all bot admins
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    with_metrics!(ctx, "admin list", async move {
        let admins = ctx.data().admins.admin_list();
        reply_embed(ctx, info_embed("🔐 Bot Admins", admin_list_text(&admins), INFO_COLOR)).await
    })
}

/// Block unprompted responses in a channel
#[poise::command(slash_command, guild_only)]
pub async fn block(
    ctx: Context<'_>,
    #[description = "The channel to block"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    with_metrics!(ctx, "admin block", async move {
        if !require_admin(ctx, "❌ Only admins can block channels!").await? {
            return Ok(());
        }
        let id = ChannelId(channel.id.get());
        let embed = if ctx.data().channels.block_channel(id) {
            info_embed(
                "🔇 Channel Blocked!",
                format!(
                    "I won't make unprompted responses in <#{id}>.\n\n**@mentions still work!**"
                ),
                SUCCESS_COLOR,
            )
        } else {
            info_embed("ℹ️ Already Blocked", format!("<#{id}> is already blocked!"), INFO_COLOR)
        };
        reply_embed(ctx, embed).await
    })
}

/// Allow unprompted responses in a channel
#[poise::command(slash_command, guild_only)]
pub async fn unblock(
    ctx: Context<'_>,
    #[description = "The channel to unblock"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    with_metrics!(ctx, "admin unblock", async move {
        if !require_admin(ctx, "❌ Only admins can unblock channels!").await? {
            return Ok(());
        }
        let id = ChannelId(channel.id.get());
        let embed = if ctx.data().channels.unblock_channel(id) {
            info_embed(
                "🔊 Channel Unblocked!",
                format!("I can respond in <#{id}> again!"),
                SUCCESS_COLOR,
            )
        } else {
            info_embed("ℹ️ Not Blocked", format!("<#{id}> wasn't blocked!"), INFO_COLOR)
        };
        reply_embed(ctx, embed).await
    })
}

/// Show all blocked channels
#[poise::command(slash_command)]
pub async fn blocked(ctx: Context<'_>) -> Result<(), Error> {
    with_metrics!(ctx, "admin blocked", async move {
        let channels = ctx.data().channels.blocked_channels();
        let embed = if channels.is_empty() {
            info_embed("🔊 No Blocked Channels", "No channels are blocked!".to_string(), SUCCESS_COLOR)
        } else {
            info_embed("🔇 Blocked Channels", blocked_list_text(&channels), WARNING_COLOR)
        };
        reply_embed(ctx, embed).await
    })
}

/// 💰 Show this month's API spend against budget
#[poise::command(slash_command)]
pub async fn budget(ctx: Context<'_>) -> Result<(), Error> {
    with_metrics!(ctx, "admin budget", async move {
        if !require_admin(ctx, "❌ Only admins can view the budget!").await? {
            return Ok(());
        }
        let status = ctx.data().costs.budget_status().await;
        reply_embed(ctx, budget_embed(&status)).await
    })
}

/// 🤖 Show AI requests, tokens and estimated cost
#[poise::command(slash_command)]
pub async fn ai(ctx: Context<'_>) -> Result<(), Error> {
    with_metrics!(ctx, "admin ai", async move {
        if !require_admin(ctx, "❌ Only admins can view AI usage!").await? {
            return Ok(());
        }
        let embed = if ctx.data().tracker.ai_enabled() {
            ai_usage_embed(&ctx.data().costs.budget_status().await)
        } else {
            serenity::CreateEmbed::new()
                .title("ℹ️ AI Not Available")
                .description("AI integration is not currently configured.")
                .color(WARNING_COLOR)
                .field(
                    "⚠️ Setup Required",
                    "Add `OPENAI_API_KEY` to environment variables to enable AI comebacks.",
                    false,
                )
        };
        reply_embed(ctx, embed).await
    })
}

/// 📈 Show command performance metrics
#[poise::command(slash_command)]
pub async fn metrics(ctx: Context<'_>) -> Result<(), Error> {
    with_metrics!(ctx, "admin metrics", async move {
        if !require_admin(ctx, "❌ Only admins can view metrics!").await? {
            return Ok(());
        }
        let metrics = &ctx.data().metrics;
        let snapshot = metrics.all_stats();
        let slowest = metrics.slowest_commands(SLOWEST_LISTED);
        metrics.log_summary();

        let embed = serenity::CreateEmbed::new()
            .title("📈 Performance Metrics")
            .description(metrics_summary(&snapshot, &slowest))
            .color(INFO_COLOR);
        reply_embed(ctx, embed).await
    })
}

/// Body of the `/admin list` embed.
pub fn admin_list_text(admins: &[UserId]) -> String {
    if admins.is_empty() {
        return "No bot-specific admins configured.\nDiscord Administrators can use admin commands."
            .to_string();
    }
    let lines: Vec<String> = admins.iter().map(|id| format!("• <@{id}>")).collect();
    format!(
        "Found **{}** bot admin(s):\n\n{}",
        admins.len(),
        lines.join("\n")
    )
}

/// Body of the `/admin blocked` embed.
pub fn blocked_list_text(channels: &[ChannelId]) -> String {
    let lines: Vec<String> = channels.iter().map(|id| format!("• <#{id}>")).collect();
    format!(
        "**{}** blocked channel(s):\n\n{}",
        channels.len(),
        lines.join("\n")
    )
}

/// One spend bucket of the budget embed: spend, budget, percentage, remaining.
pub fn budget_field(status: &BudgetStatus, category: CostCategory) -> String {
    format!(
        "**${:.4}** / ${:.2}\n**{:.1}%** used • ${:.2} left",
        status.costs.get(category),
        status.budgets.get(category),
        status.percentages.get(category),
        status.remaining.get(category)
    )
}

/// Progress bars for every bucket.
pub fn budget_progress(status: &BudgetStatus) -> String {
    [
        ("AI", CostCategory::Ai),
        ("Zyte", CostCategory::Zyte),
        ("Total", CostCategory::Total),
    ]
    .iter()
    .map(|(label, category)| {
        let percent = status.percentages.get(*category);
        format!("**{label}:** {} {percent:.0}%", progress_bar(percent))
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn budget_embed(status: &BudgetStatus) -> serenity::CreateEmbed {
    let indicator = |category| budget_indicator(status.percentages.get(category));

    let mut zyte = budget_field(status, CostCategory::Zyte);
    zyte.push_str(&format!("\n📡 {} requests", thousands(status.usage.zyte_requests)));
    if status.zyte_spend_limit > 0.0 {
        zyte.push_str(&format!("\n🛑 Cap: ${:.0}", status.zyte_spend_limit));
        if status.zyte_over_limit {
            zyte.push_str(" (disabled)");
        }
    }

    let mut note = String::from(
        "Budgets are configured in environment variables:\n\
         `AI_MONTHLY_BUDGET`, `ZYTE_MONTHLY_BUDGET`, `TOTAL_MONTHLY_BUDGET`\n\
         Alerts trigger at 50%, 80%, 90%, and 100% of budget.",
    );
    if status.zyte_spend_limit > 0.0 {
        note.push_str(&format!(
            "\n**ZYTE_SPEND_LIMIT**=${:.0} disables Zyte API when reached.",
            status.zyte_spend_limit
        ));
    }

    serenity::CreateEmbed::new()
        .title("💰 Monthly Budget Status")
        .description(format!("API costs for {}", status.month))
        .color(INFO_COLOR)
        .field(
            format!("{} AI", indicator(CostCategory::Ai)),
            budget_field(status, CostCategory::Ai),
            true,
        )
        .field(format!("{} Zyte API", indicator(CostCategory::Zyte)), zyte, true)
        .field(
            format!("{} Total Budget", indicator(CostCategory::Total)),
            budget_field(status, CostCategory::Total),
            true,
        )
        .field("📊 Progress", budget_progress(status), false)
        .field("ℹ️ About Budgets", note, false)
        .footer(serenity::CreateEmbedFooter::new("💡 Resets monthly • Kept in memory"))
}

/// Formats a count with comma separators, e.g. `12,345`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Inline fields of the `/admin ai` report: requests, tokens and cost.
pub fn ai_usage_fields(status: &BudgetStatus) -> [(&'static str, String); 3] {
    [
        ("📊 Total Requests", format!("**{}** queries", thousands(status.usage.ai_requests))),
        ("🎯 Total Tokens", format!("**{}** tokens", thousands(status.usage.ai_tokens))),
        ("💰 Total Cost", format!("**${:.4}**", status.costs.ai)),
    ]
}

fn ai_usage_embed(status: &BudgetStatus) -> serenity::CreateEmbed {
    ai_usage_fields(status)
        .into_iter()
        .fold(
            serenity::CreateEmbed::new()
                .title("🤖 AI Usage Report (Bot Tracked)")
                .description(format!("Stats tracked by this bot for {}", status.month))
                .color(INFO_COLOR),
            |embed, (name, value)| embed.field(name, value, true),
        )
        .footer(serenity::CreateEmbedFooter::new("💡 Bot-tracked stats | Resets on bot restart"))
}

/// Body of the `/admin metrics` embed.
pub fn metrics_summary(snapshot: &MetricsSnapshot, slowest: &[SlowCommand]) -> String {
    let mut lines = vec![
        format!("⏱️ **Uptime:** {}", format_duration_secs(snapshot.uptime_seconds)),
        format!("📨 **Commands:** {}", snapshot.total_commands),
        format!("❌ **Errors:** {}", snapshot.total_errors),
    ];

    if !slowest.is_empty() {
        lines.push(String::new());
        lines.push("🐢 **Slowest commands:**".to_string());
        lines.extend(slowest.iter().map(|s| {
            format!("• `/{}`: {:.2}s avg ({} calls)", s.command, s.avg_time, s.count)
        }));
    }
    lines.join("\n")
}

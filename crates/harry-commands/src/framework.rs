//! Poise framework setup, shared state and event routing.

use harry_common::{ChannelId, MessageId};
use harry_config::Config;
use harry_fun::{
    Collaborators, EngagementSettings, EngagementTracker, FastRandSource, InboundMessage,
    InteractionDedup, OpenAiGenerator, Outcome, SystemClock, TextGenerator,
};
use harry_monitoring::{CostTracker, ErrorReporter, PerformanceMetrics};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::channels::ChannelManager;
use crate::permissions::AdminManager;
use crate::transport::{from_serenity_guild, from_serenity_user, SerenityTransport};

/// Application data accessible in all commands.
pub struct Data {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Per-guild engagement state.
    pub tracker: Arc<EngagementTracker>,
    /// Bot admin list.
    pub admins: Arc<AdminManager>,
    /// Channels without unprompted responses.
    pub channels: Arc<ChannelManager>,
    /// Command timings and error counts.
    pub metrics: Arc<PerformanceMetrics>,
    /// Monthly API spend.
    pub costs: Arc<CostTracker>,
    /// Error reporting.
    pub reporter: Arc<ErrorReporter>,
    /// Duplicate interaction filter.
    pub dedup: Arc<InteractionDedup>,
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("tracker", &self.tracker)
            .field("admins", &self.admins)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl Data {
    /// Builds every shared component from configuration.
    pub fn new(config: Config) -> Result<Self, Error> {
        let costs = Arc::new(CostTracker::new(config.budget.clone(), &config.ai));
        let admins = Arc::new(AdminManager::new(&config));
        let clock = Arc::new(SystemClock::new());

        let generator: Option<Arc<dyn TextGenerator>> = if config.ai.is_enabled() {
            Some(Arc::new(OpenAiGenerator::new(&config.ai, Some(costs.clone()))?))
        } else {
            info!("No AI key configured, comebacks will use templates");
            None
        };

        let tracker = EngagementTracker::new(
            EngagementSettings::from_config(&config),
            Collaborators {
                authorizer: admins.clone(),
                clock: clock.clone(),
                random: Arc::new(FastRandSource::new()),
                generator,
            },
        )?;

        let dedup = InteractionDedup::new(
            Duration::from_secs(config.fun.dedup_window_seconds),
            clock,
        );
        let metrics = PerformanceMetrics::new(Duration::from_secs_f64(
            config.monitoring.slow_command_seconds,
        ));
        let reporter = ErrorReporter::new(&config.monitoring);

        Ok(Self {
            config: Arc::new(config),
            tracker: Arc::new(tracker),
            admins,
            channels: Arc::new(ChannelManager::new()),
            metrics: Arc::new(metrics),
            costs,
            reporter: Arc::new(reporter),
            dedup: Arc::new(dedup),
        })
    }
}

/// Application error type for commands.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type.
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Creates a new Poise framework.
pub fn create_framework() -> poise::FrameworkBuilder<Data, Error> {
    poise::Framework::builder().options(framework_options())
}

/// Commands, checks and hooks shared by every framework instance.
pub fn framework_options() -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: vec![crate::fun::fun(), crate::admin::admin()],
        command_check: Some(|ctx| {
            Box::pin(async move { Ok(ctx.data().dedup.check_and_record(ctx.id())) })
        }),
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = ctx.command().qualified_name.clone();
            error!("Command {} failed: {}", command, error);
            let data = ctx.data();
            data.metrics.record_error(&command);
            data.reporter.capture_error(
                &*error,
                &[
                    ("command", command.clone()),
                    ("user", ctx.author().id.to_string()),
                ],
            );
            let reply = poise::CreateReply::default()
                .content("❌ Something went wrong. Try again later.")
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                warn!("Failed to report error to user: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed { ctx, .. } => {
            debug!(
                "Ignoring duplicate invocation {} of {}",
                ctx.id(),
                ctx.command().qualified_name
            );
        }
        poise::FrameworkError::EventHandler {
            error, framework, ..
        } => {
            error!("Event handler failed: {}", error);
            framework
                .user_data
                .reporter
                .capture_error(&*error, &[("source", "event_handler".to_string())]);
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        let inbound = inbound_message(new_message, framework.bot_id, &data.channels);
        let transport = SerenityTransport::new(ctx.http.clone());
        let outcome = data.tracker.handle_message(&inbound, &transport).await;
        if outcome != Outcome::Ignored {
            debug!("Message {} from {}: {:?}", inbound.id, inbound.author_id, outcome);
        }
    }
    Ok(())
}

/// Translates a gateway message into the tracker's view of it.
pub fn inbound_message(
    message: &serenity::Message,
    bot_id: serenity::UserId,
    channels: &ChannelManager,
) -> InboundMessage {
    let channel_id = ChannelId(message.channel_id.get());
    let author_name = message
        .member
        .as_ref()
        .and_then(|m| m.nick.clone())
        .unwrap_or_else(|| message.author.display_name().to_string());

    InboundMessage {
        id: MessageId(message.id.get()),
        guild_id: message.guild_id.map(from_serenity_guild),
        channel_id,
        author_id: from_serenity_user(message.author.id),
        author_name,
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        reply_to: message
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id)
            .map(|id| MessageId(id.get())),
        mentions_bot: message.mentions.iter().any(|u| u.id == bot_id),
        in_blocked_channel: channels.is_blocked(channel_id),
    }
}

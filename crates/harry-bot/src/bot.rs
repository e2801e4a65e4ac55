//! Core bot logic using the Poise framework.

use crate::error::{BotError, BotResult};
use harry_commands::{create_framework, Data};
use harry_config::Config;
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Gateway intents Harry needs: guild messages with their content.
pub fn gateway_intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
}

/// Main bot structure.
pub struct HarryBot {
    token: String,
    dev_guild_id: Option<u64>,
    data: Data,
}

impl std::fmt::Debug for HarryBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarryBot")
            .field("dev_guild_id", &self.dev_guild_id)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl HarryBot {
    /// Creates a new bot instance, building all shared state up front.
    pub fn new(config: Config) -> BotResult<Self> {
        let token = config.discord.token.clone();
        let dev_guild_id = config.discord.dev_guild_id;
        let data = Data::new(config).map_err(|e| BotError::Framework(e.to_string()))?;
        Ok(Self {
            token,
            dev_guild_id,
            data,
        })
    }

    /// Shared state handed to every command.
    pub const fn data(&self) -> &Data {
        &self.data
    }

    /// Connects to Discord and runs until the gateway closes or Ctrl-C.
    pub async fn start(self) -> BotResult<()> {
        let Self {
            token,
            dev_guild_id,
            data,
        } = self;
        let metrics = data.metrics.clone();

        let framework = create_framework()
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    let commands = &framework.options().commands;
                    if let Some(guild) = dev_guild_id {
                        poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(guild)).await?;
                        info!("Registered {} commands in guild {}", commands.len(), guild);
                    } else {
                        poise::builtins::register_globally(ctx, commands).await?;
                        info!("Registered {} commands globally", commands.len());
                    }
                    info!("Logged in as {}", ready.user.name);
                    Ok(data)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(&token, gateway_intents())
            .framework(framework)
            .await?;

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown requested, closing shards");
                    shard_manager.shutdown_all().await;
                }
                Err(e) => warn!("Could not listen for Ctrl-C: {}", e),
            }
        });

        let result = client.start().await;
        metrics.log_summary();
        result?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_include_message_content() {
        let intents = gateway_intents();
        assert!(intents.contains(serenity::GatewayIntents::GUILD_MESSAGES));
        assert!(intents.contains(serenity::GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(serenity::GatewayIntents::GUILDS));
    }
}

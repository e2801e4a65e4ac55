//! Main entry point for Harry.

use harry_bot::{BotResult, HarryBot};
use harry_common::init_logging;
use harry_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> BotResult<()> {
    let loader = ConfigLoader::from_env();
    let config = loader.load().await?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = init_logging(&config.logging)?;
    info!("Starting Harry with configuration from {}", loader.path().display());

    let bot = HarryBot::new(config)?;
    if let Err(e) = bot.start().await {
        error!("Bot stopped with an error: {}", e);
        return Err(e);
    }

    info!("Harry shut down cleanly");
    Ok(())
}

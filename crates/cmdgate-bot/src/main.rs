//! Main entry point for the CmdGate bot.

use cmdgate_bot::{logging, BotResult, CmdGateBot};
use cmdgate_config::ConfigLoader;
use std::env;
use tracing::{error, info};

/// Environment variable naming the configuration file.
const CONFIG_PATH_ENV: &str = "CMDGATE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> BotResult<()> {
    let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = ConfigLoader::new(path).load_or_default().await?;

    let _guard = logging::init(&config.logging);
    config.validate()?;

    info!("Starting CmdGate bot");
    let bot = CmdGateBot::new(config);

    if let Err(e) = bot.start().await {
        error!("Bot stopped: {}", e);
        return Err(e);
    }

    Ok(())
}

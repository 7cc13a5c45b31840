//! Bot lifecycle.

use chrono::{DateTime, Utc};
use cmdgate_config::{Config, ConfigCache};
use cmdgate_dispatch::{Dispatcher, SharedLatency};
use serenity::all::{Client, GatewayIntents};
use std::sync::Arc;
use tracing::{info, warn};

use crate::commands;
use crate::error::{BotError, BotResult};
use crate::handler::Handler;
use crate::latency;

/// Main bot structure.
pub struct CmdGateBot {
    config: Arc<ConfigCache>,
    latency: Arc<SharedLatency>,
    started_at: DateTime<Utc>,
}

impl CmdGateBot {
    /// Creates a new bot instance.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(ConfigCache::new(config)),
            latency: Arc::new(SharedLatency::new()),
            started_at: Utc::now(),
        }
    }

    /// Shared configuration. Updating it changes response strings for the
    /// next interaction.
    pub const fn config(&self) -> &Arc<ConfigCache> {
        &self.config
    }

    /// Builds the dispatcher with the built-in commands.
    pub fn dispatcher(&self) -> Dispatcher {
        let registry = commands::build_registry(self.latency.clone(), self.started_at);
        info!(commands = ?registry.names(), "Built command registry");

        Dispatcher::builder(Arc::new(registry), Arc::clone(&self.config))
            .latency(self.latency.clone())
            .build()
    }

    /// Connects to Discord and runs until the gateway shuts down or Ctrl-C
    /// is received.
    pub async fn start(&self) -> BotResult<()> {
        let token = self.config.get().discord.token.clone();
        let handler = Handler::new(Arc::new(self.dispatcher()), Arc::clone(&self.config));

        let mut client = Client::builder(&token, GatewayIntents::non_privileged())
            .event_handler(handler)
            .await?;

        let refresher =
            latency::spawn_refresh(Arc::clone(&client.shard_manager), Arc::clone(&self.latency));

        let shards = Arc::clone(&client.shard_manager);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown requested");
                    shards.shutdown_all().await;
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });

        let result = client.start().await;
        refresher.abort();
        result.map_err(BotError::from)
    }
}

impl std::fmt::Debug for CmdGateBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmdGateBot")
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

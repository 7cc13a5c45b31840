//! Serenity event handler.

use async_trait::async_trait;
use cmdgate_config::ConfigCache;
use cmdgate_dispatch::Dispatcher;
use serenity::all::{Command as ApplicationCommand, Context, EventHandler, Http, Interaction, Ready};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::commands;
use crate::responder::inbound_interaction;

/// Forwards command interactions to the dispatcher.
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    config: Arc<ConfigCache>,
}

impl Handler {
    /// Creates a handler.
    pub const fn new(dispatcher: Arc<Dispatcher>, config: Arc<ConfigCache>) -> Self {
        Self { dispatcher, config }
    }
}

/// Registers the built-in commands, to the development guild when one is
/// given and globally otherwise. Returns how many commands Discord accepted.
pub async fn register_commands(
    http: &Http,
    dev_guild: Option<cmdgate_common::GuildId>,
) -> serenity::Result<usize> {
    let definitions = commands::definitions();
    let registered = match dev_guild {
        Some(guild) => {
            serenity::all::GuildId::new(guild.0)
                .set_commands(http, definitions)
                .await?
        }
        None => ApplicationCommand::set_global_commands(http, definitions).await?,
    };
    Ok(registered.len())
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to Discord"
        );

        let dev_guild = self.config.get().discord.dev_guild_id;
        match register_commands(&ctx.http, dev_guild).await {
            Ok(count) => match dev_guild {
                Some(guild) => info!(count, %guild, "Registered commands to development guild"),
                None => info!(count, "Registered commands globally"),
            },
            Err(e) => error!(error = %e, "Failed to register commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        let Some(inbound) = inbound_interaction(Arc::clone(&ctx.http), command) else {
            return;
        };

        let outcome = self.dispatcher.dispatch(inbound).await;
        debug!(?outcome, "Interaction dispatched");
    }
}

//! Inhibitors veto a command before it runs.
//!
//! An inhibitor that rejects an invocation is responsible for telling the user
//! why, if anything should be said at all. The built-in inhibitors reply with
//! an ephemeral message when one is configured and stay silent otherwise.

use async_trait::async_trait;
use cmdgate_common::{ChannelId, GuildId, UserId};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::context::CommandContext;
use crate::interaction::Reply;

/// A predicate run before a command's handler.
#[async_trait]
pub trait Inhibitor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `true` to let the command run.
    async fn check(&self, ctx: &CommandContext) -> bool;
}

// Sends the optional rejection message and vetoes the command.
async fn reject(ctx: &CommandContext, message: Option<&str>) -> bool {
    if let Some(message) = message {
        if let Err(e) = ctx.reply(Reply::ephemeral(message)).await {
            warn!(
                command = ctx.command_name(),
                error = %e,
                "Failed to send inhibitor rejection"
            );
        }
    }
    false
}

/// Restricts a command to a set of users.
#[derive(Debug, Clone)]
pub struct UserOnly {
    users: HashSet<UserId>,
    message: Option<String>,
}

impl UserOnly {
    /// Allows only the given users.
    pub fn new(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            users: users.into_iter().collect(),
            message: None,
        }
    }

    /// Replies with `message` when rejecting.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[async_trait]
impl Inhibitor for UserOnly {
    fn name(&self) -> &'static str {
        "user_only"
    }

    async fn check(&self, ctx: &CommandContext) -> bool {
        if self.users.contains(&ctx.user_id()) {
            return true;
        }
        debug!(user = %ctx.user_id(), "User is not allowed to use this command");
        reject(ctx, self.message.as_deref()).await
    }
}

/// Restricts a command to guilds, optionally to specific ones.
#[derive(Debug, Clone, Default)]
pub struct GuildOnly {
    guilds: Option<HashSet<GuildId>>,
    message: Option<String>,
}

impl GuildOnly {
    /// Allows any guild but rejects direct messages.
    pub fn any() -> Self {
        Self::default()
    }

    /// Allows only the given guilds.
    pub fn new(guilds: impl IntoIterator<Item = GuildId>) -> Self {
        Self {
            guilds: Some(guilds.into_iter().collect()),
            message: None,
        }
    }

    /// Replies with `message` when rejecting.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[async_trait]
impl Inhibitor for GuildOnly {
    fn name(&self) -> &'static str {
        "guild_only"
    }

    async fn check(&self, ctx: &CommandContext) -> bool {
        let allowed = match (ctx.guild_id(), &self.guilds) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(guild), Some(guilds)) => guilds.contains(&guild),
        };
        if allowed {
            return true;
        }
        debug!(guild = ?ctx.guild_id(), "Command not available here");
        reject(ctx, self.message.as_deref()).await
    }
}

/// Restricts a command to a set of channels.
#[derive(Debug, Clone)]
pub struct ChannelOnly {
    channels: HashSet<ChannelId>,
    message: Option<String>,
}

impl ChannelOnly {
    /// Allows only the given channels.
    pub fn new(channels: impl IntoIterator<Item = ChannelId>) -> Self {
        Self {
            channels: channels.into_iter().collect(),
            message: None,
        }
    }

    /// Replies with `message` when rejecting.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[async_trait]
impl Inhibitor for ChannelOnly {
    fn name(&self) -> &'static str {
        "channel_only"
    }

    async fn check(&self, ctx: &CommandContext) -> bool {
        if self.channels.contains(&ctx.channel_id()) {
            return true;
        }
        debug!(channel = %ctx.channel_id(), "Command not allowed in this channel");
        reject(ctx, self.message.as_deref()).await
    }
}

//! `/uptime`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cmdgate_common::{format_duration, format_timestamp};
use cmdgate_dispatch::{AutoDeferType, Command, CommandContext, CommandResult, Reply};
use serenity::all::CreateCommand;
use std::sync::Arc;

use super::respond;

/// Reports how long the bot has been running.
pub struct Uptime {
    started_at: DateTime<Utc>,
}

impl Uptime {
    /// Creates the command for a process started at `started_at`.
    pub const fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    fn render(&self, now: DateTime<Utc>) -> String {
        let elapsed = (now - self.started_at).to_std().unwrap_or_default();
        format!(
            "Up for {} (since {}).",
            format_duration(elapsed),
            format_timestamp(self.started_at)
        )
    }
}

/// Registration payload.
pub fn definition() -> CreateCommand {
    CreateCommand::new("uptime").description("Show how long the bot has been running")
}

#[async_trait]
impl Command for Uptime {
    fn name(&self) -> &str {
        "uptime"
    }

    fn auto_defer(&self) -> Option<AutoDeferType> {
        Some(AutoDeferType::Ephemeral)
    }

    async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult {
        respond(&ctx, Reply::ephemeral(self.render(Utc::now()))).await?;
        Ok(())
    }
}

//! `/ping`: reports the gateway latency.

use async_trait::async_trait;
use cmdgate_dispatch::{Command, CommandContext, CommandResult, LatencyProbe};
use serenity::all::CreateCommand;
use std::sync::Arc;
use std::time::Duration;

/// Pong.
pub struct Ping {
    latency: Arc<dyn LatencyProbe>,
}

impl Ping {
    /// Creates the command reading latency from `latency`.
    pub fn new(latency: Arc<dyn LatencyProbe>) -> Self {
        Self { latency }
    }
}

/// Registration payload.
pub fn definition() -> CreateCommand {
    CreateCommand::new("ping").description("Check that the bot is responsive")
}

#[async_trait]
impl Command for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    fn cooldown(&self) -> Option<Duration> {
        Some(Duration::from_secs(3))
    }

    async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult {
        let content = match self.latency.round_trip() {
            Some(latency) => format!("Pong! Gateway latency is {} ms.", latency.as_millis()),
            None => "Pong! Gateway latency is not known yet.".to_string(),
        };
        ctx.reply(content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgate_common::test_utils::discord_fixtures;
    use cmdgate_dispatch::testing::{chat_input, RecordingResponder, ResponderCall};
    use cmdgate_dispatch::{Reply, SharedLatency};

    #[tokio::test]
    async fn test_ping_reports_latency() {
        let latency = Arc::new(SharedLatency::new());
        latency.record(Duration::from_millis(42));
        let command = Arc::new(Ping::new(latency));
        let responder = Arc::new(RecordingResponder::new());
        let interaction = chat_input("ping", discord_fixtures::test_user_id(), &responder);
        let ctx = Arc::new(CommandContext::build(interaction, command.clone()));

        command.run(ctx).await.unwrap();

        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::new(
                "Pong! Gateway latency is 42 ms."
            ))]
        );
    }
}

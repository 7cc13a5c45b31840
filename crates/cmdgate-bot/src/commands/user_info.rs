//! "User Info" user context-menu command.

use anyhow::{anyhow, Context as _};
use async_trait::async_trait;
use cmdgate_common::{format_timestamp, snowflake_timestamp, UserId};
use cmdgate_dispatch::{
    Command, CommandContext, CommandError, CommandResult, ContextMenuTarget, GuildOnly, Inhibitor,
    Reply,
};
use serenity::all::{CommandType, CreateCommand};
use std::sync::Arc;

use super::respond;

/// Command name.
pub const NAME: &str = "User Info";

/// Shows basic facts about the targeted user. Server only.
pub struct UserInfo {
    inhibitors: Vec<Box<dyn Inhibitor>>,
}

impl UserInfo {
    /// Creates the command.
    pub fn new() -> Self {
        let guild_only: Box<dyn Inhibitor> =
            Box::new(GuildOnly::any().with_message("This command can only be used in a server."));
        Self {
            inhibitors: vec![guild_only],
        }
    }
}

impl Default for UserInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration payload.
pub fn definition() -> CreateCommand {
    CreateCommand::new(NAME).kind(CommandType::User)
}

fn describe(user: UserId) -> anyhow::Result<String> {
    let created = snowflake_timestamp(user.0)
        .with_context(|| format!("user id {user} carries no valid timestamp"))?;
    Ok(format!(
        "<@{user}>\nID: {user}\nAccount created: {}",
        format_timestamp(created)
    ))
}

#[async_trait]
impl Command for UserInfo {
    fn name(&self) -> &str {
        NAME
    }

    fn inhibitors(&self) -> &[Box<dyn Inhibitor>] {
        &self.inhibitors
    }

    async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult {
        let Some(ContextMenuTarget::User(user)) = ctx.arguments().target() else {
            return Err(anyhow!("{NAME} invoked without a user target").into());
        };
        ctx.reply(Reply::ephemeral(describe(user)?)).await?;
        Ok(())
    }

    async fn on_error(
        &self,
        ctx: Arc<CommandContext>,
        _error: &CommandError,
    ) -> Option<CommandResult> {
        let result = respond(&ctx, Reply::ephemeral("Could not look up that user.")).await;
        Some(result.map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgate_common::test_utils::discord_fixtures;
    use cmdgate_config::ConfigCache;
    use cmdgate_dispatch::testing::{
        chat_input, direct_message, user_context_menu, RecordingResponder, ResponderCall,
    };
    use cmdgate_dispatch::{CommandRegistry, DispatchOutcome, Dispatcher, Recovery};

    fn dispatcher() -> Dispatcher {
        let registry = Arc::new(CommandRegistry::new());
        registry.register(Arc::new(UserInfo::new()));
        Dispatcher::builder(registry, Arc::new(ConfigCache::default())).build()
    }

    #[test]
    fn test_describe() {
        let described = describe(UserId(175_928_847_299_117_063)).unwrap();
        assert!(described.contains("Account created: 2016-04-30"));
    }

    #[tokio::test]
    async fn test_describes_target_in_guild() {
        let responder = Arc::new(RecordingResponder::new());
        let target = UserId(175_928_847_299_117_063);
        let outcome = dispatcher()
            .dispatch(user_context_menu(
                NAME,
                discord_fixtures::test_user_id(),
                target,
                &responder,
            ))
            .await;

        assert_eq!(outcome, DispatchOutcome::Completed);
        assert!(matches!(
            &responder.calls()[..],
            [ResponderCall::Reply(reply)] if reply.is_ephemeral() && reply.content().contains("ID: 175928847299117063")
        ));
    }

    #[tokio::test]
    async fn test_rejected_in_direct_messages() {
        let responder = Arc::new(RecordingResponder::new());
        let outcome = dispatcher()
            .dispatch(direct_message(NAME, discord_fixtures::test_user_id(), &responder))
            .await;

        assert_eq!(outcome, DispatchOutcome::Inhibited);
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::ephemeral(
                "This command can only be used in a server."
            ))]
        );
    }

    #[tokio::test]
    async fn test_missing_target_uses_error_hook() {
        let responder = Arc::new(RecordingResponder::new());
        let outcome = dispatcher()
            .dispatch(chat_input(NAME, discord_fixtures::test_user_id(), &responder))
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                recovery: Recovery::Hook
            }
        );
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::ephemeral(
                "Could not look up that user."
            ))]
        );
    }
}

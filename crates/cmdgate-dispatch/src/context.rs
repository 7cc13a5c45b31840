//! Invocation context handed to commands, inhibitors and error hooks.

use chrono::{DateTime, Utc};
use cmdgate_common::{ChannelId, GuildId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::command::Command;
use crate::error::ResponseError;
use crate::interaction::{
    CommandArguments, InboundInteraction, InteractionMeta, InteractionResponder, InvokingUser,
    Reply, SentMessage,
};

/// Everything a command needs to handle one invocation.
///
/// The reply-path methods forward to the platform and keep the
/// [`replied`](Self::replied) / [`deferred`](Self::deferred) flags in sync with
/// what actually succeeded. Only one of [`reply`](Self::reply) and
/// [`defer_reply`](Self::defer_reply) can be the first response; afterwards
/// both fail with [`ResponseError::AlreadyAcknowledged`] without reaching the
/// platform. Edits, fetches, deletes and follow-ups need a prior
/// acknowledgment.
pub struct CommandContext {
    invocation_id: Uuid,
    meta: InteractionMeta,
    arguments: CommandArguments,
    command: Arc<dyn Command>,
    responder: Arc<dyn InteractionResponder>,
    ack: Mutex<()>,
    replied: AtomicBool,
    deferred: AtomicBool,
}

impl CommandContext {
    /// Builds the context for `command` from an inbound interaction.
    pub fn build(interaction: InboundInteraction, command: Arc<dyn Command>) -> Self {
        let (meta, arguments, responder) = match interaction {
            InboundInteraction::ChatInput(chat) => (
                chat.meta,
                CommandArguments::Options(chat.options),
                chat.responder,
            ),
            InboundInteraction::ContextMenu(menu) => (
                menu.meta,
                CommandArguments::Target(menu.target),
                menu.responder,
            ),
        };

        Self {
            invocation_id: Uuid::new_v4(),
            meta,
            arguments,
            command,
            responder,
            ack: Mutex::new(()),
            replied: AtomicBool::new(false),
            deferred: AtomicBool::new(false),
        }
    }

    /// Unique id of this invocation, for correlating logs.
    pub const fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    /// Identity fields of the originating interaction.
    pub const fn meta(&self) -> &InteractionMeta {
        &self.meta
    }

    /// Invoking user.
    pub const fn user(&self) -> &InvokingUser {
        &self.meta.user
    }

    /// Invoking user's id.
    pub const fn user_id(&self) -> UserId {
        self.meta.user.id
    }

    /// Guild the command was used in, `None` in direct messages.
    pub const fn guild_id(&self) -> Option<GuildId> {
        self.meta.guild_id
    }

    /// Channel the command was used in.
    pub const fn channel_id(&self) -> ChannelId {
        self.meta.channel_id
    }

    /// When the interaction was created.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at
    }

    /// Creation time as unix milliseconds.
    pub fn created_timestamp(&self) -> i64 {
        self.meta.created_at.timestamp_millis()
    }

    /// The resolved command.
    pub const fn command(&self) -> &Arc<dyn Command> {
        &self.command
    }

    /// Name of the resolved command.
    pub fn command_name(&self) -> &str {
        self.command.name()
    }

    /// Argument payload, unparsed.
    pub const fn arguments(&self) -> &CommandArguments {
        &self.arguments
    }

    /// Whether a reply has been sent or edited in.
    pub fn replied(&self) -> bool {
        self.replied.load(Ordering::SeqCst)
    }

    /// Whether the interaction has been deferred.
    pub fn deferred(&self) -> bool {
        self.deferred.load(Ordering::SeqCst)
    }

    /// Whether the interaction has been replied to or deferred.
    pub fn is_acknowledged(&self) -> bool {
        self.replied() || self.deferred()
    }

    /// Sends the initial reply.
    pub async fn reply(&self, reply: impl Into<Reply> + Send) -> Result<(), ResponseError> {
        let _ack = self.ack.lock().await;
        if self.is_acknowledged() {
            return Err(ResponseError::AlreadyAcknowledged);
        }

        self.responder.reply(reply.into()).await?;
        self.replied.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Acknowledges the interaction without replying yet.
    pub async fn defer_reply(&self, ephemeral: bool) -> Result<(), ResponseError> {
        let _ack = self.ack.lock().await;
        if self.is_acknowledged() {
            return Err(ResponseError::AlreadyAcknowledged);
        }

        self.responder.defer_reply(ephemeral).await?;
        self.deferred.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Edits the initial reply, or fills in a deferred one.
    pub async fn edit_reply(&self, content: impl AsRef<str> + Send) -> Result<SentMessage, ResponseError> {
        self.require_acknowledged().await?;
        let message = self.responder.edit_reply(content.as_ref()).await?;
        self.replied.store(true, Ordering::SeqCst);
        Ok(message)
    }

    /// Deletes the initial reply.
    pub async fn delete_reply(&self) -> Result<(), ResponseError> {
        self.require_acknowledged().await?;
        self.responder.delete_reply().await
    }

    /// Fetches the initial reply.
    pub async fn fetch_reply(&self) -> Result<SentMessage, ResponseError> {
        self.require_acknowledged().await?;
        self.responder.fetch_reply().await
    }

    /// Sends an additional message after the initial response.
    pub async fn follow_up(&self, reply: impl Into<Reply> + Send) -> Result<SentMessage, ResponseError> {
        self.require_acknowledged().await?;
        self.responder.follow_up(reply.into()).await
    }

    // Waits out any acknowledgment in flight before checking the flags.
    async fn require_acknowledged(&self) -> Result<(), ResponseError> {
        drop(self.ack.lock().await);
        if self.is_acknowledged() {
            Ok(())
        } else {
            Err(ResponseError::NotAcknowledged)
        }
    }
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("invocation_id", &self.invocation_id)
            .field("command", &self.command_name())
            .field("meta", &self.meta)
            .field("replied", &self.replied())
            .field("deferred", &self.deferred())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ContextMenuTarget;
    use crate::testing::{
        chat_input, user_context_menu, RecordingResponder, ResponderCall, ScriptedCommand,
    };
    use cmdgate_common::test_utils::discord_fixtures;

    fn context(responder: &Arc<RecordingResponder>) -> CommandContext {
        let interaction = chat_input("echo", discord_fixtures::test_user_id(), responder);
        CommandContext::build(interaction, Arc::new(ScriptedCommand::new("echo")))
    }

    #[tokio::test]
    async fn test_build_copies_identity_fields() {
        let responder = Arc::new(RecordingResponder::new());
        let interaction = chat_input("echo", discord_fixtures::test_user_id(), &responder);
        let expected_meta = interaction.meta().clone();

        let ctx = CommandContext::build(interaction, Arc::new(ScriptedCommand::new("echo")));

        assert_eq!(ctx.meta(), &expected_meta);
        assert_eq!(ctx.user_id(), discord_fixtures::test_user_id());
        assert_eq!(ctx.guild_id(), Some(discord_fixtures::test_guild_id()));
        assert_eq!(ctx.channel_id(), discord_fixtures::test_channel_id());
        assert_eq!(ctx.created_timestamp(), expected_meta.created_at.timestamp_millis());
        assert_eq!(ctx.command_name(), "echo");
        assert!(matches!(ctx.arguments(), CommandArguments::Options(_)));
        assert!(!ctx.replied());
        assert!(!ctx.deferred());
    }

    #[tokio::test]
    async fn test_build_selects_context_menu_target() {
        let responder = Arc::new(RecordingResponder::new());
        let target = discord_fixtures::test_user_ids(1)[0];
        let interaction = user_context_menu(
            "User Info",
            discord_fixtures::test_user_id(),
            target,
            &responder,
        );

        let ctx = CommandContext::build(interaction, Arc::new(ScriptedCommand::new("User Info")));
        assert_eq!(
            ctx.arguments().target(),
            Some(ContextMenuTarget::User(target))
        );
    }

    #[tokio::test]
    async fn test_reply_sets_replied_and_blocks_second_acknowledgment() {
        let responder = Arc::new(RecordingResponder::new());
        let ctx = context(&responder);

        ctx.reply(Reply::ephemeral("first")).await.unwrap();
        assert!(ctx.replied());
        assert!(!ctx.deferred());

        assert!(matches!(
            ctx.reply("second").await,
            Err(ResponseError::AlreadyAcknowledged)
        ));
        assert!(matches!(
            ctx.defer_reply(false).await,
            Err(ResponseError::AlreadyAcknowledged)
        ));

        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::ephemeral("first"))]
        );
    }

    #[tokio::test]
    async fn test_defer_then_edit() {
        let responder = Arc::new(RecordingResponder::new());
        let ctx = context(&responder);

        ctx.defer_reply(true).await.unwrap();
        assert!(ctx.deferred());
        assert!(!ctx.replied());

        let message = ctx.edit_reply("done").await.unwrap();
        assert_eq!(message.content, "done");
        assert!(ctx.replied());

        ctx.follow_up("more").await.unwrap();
        ctx.fetch_reply().await.unwrap();
        ctx.delete_reply().await.unwrap();

        assert_eq!(
            responder.calls(),
            vec![
                ResponderCall::DeferReply { ephemeral: true },
                ResponderCall::EditReply("done".to_string()),
                ResponderCall::FollowUp(Reply::new("more")),
                ResponderCall::FetchReply,
                ResponderCall::DeleteReply,
            ]
        );
    }

    #[tokio::test]
    async fn test_operations_before_acknowledgment_are_rejected() {
        let responder = Arc::new(RecordingResponder::new());
        let ctx = context(&responder);

        assert!(matches!(
            ctx.edit_reply("x").await,
            Err(ResponseError::NotAcknowledged)
        ));
        assert!(matches!(
            ctx.follow_up("x").await,
            Err(ResponseError::NotAcknowledged)
        ));
        assert!(matches!(
            ctx.fetch_reply().await,
            Err(ResponseError::NotAcknowledged)
        ));
        assert!(matches!(
            ctx.delete_reply().await,
            Err(ResponseError::NotAcknowledged)
        ));
        assert!(responder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_platform_failure_leaves_flags_untouched() {
        let responder = Arc::new(RecordingResponder::failing());
        let ctx = context(&responder);

        assert!(matches!(
            ctx.reply("x").await,
            Err(ResponseError::Platform(_))
        ));
        assert!(!ctx.replied());

        assert!(ctx.defer_reply(false).await.is_err());
        assert!(!ctx.deferred());
    }
}

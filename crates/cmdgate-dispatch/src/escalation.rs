//! Handler failure escalation.

use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{error, trace, warn};

use crate::command::CommandError;
use crate::context::CommandContext;
use crate::error::{HandlerPanic, ResponseError};
use crate::interaction::Reply;

/// How a handler failure was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The command's error hook handled it.
    Hook,
    /// The generic error message was sent.
    Fallback,
    /// The generic error message could not be sent either.
    FallbackFailed,
}

/// Logs `error` and makes sure the user sees something.
///
/// The command's error hook runs first when it has one. Without a hook, or
/// when the hook itself fails or panics, `message` is sent as an edit of the existing
/// response if the interaction was acknowledged, and as an ephemeral reply
/// otherwise.
pub async fn escalate(ctx: Arc<CommandContext>, error: CommandError, message: &str) -> Recovery {
    log_failure(&ctx, error.as_ref(), "Command failed");

    let command = Arc::clone(ctx.command());
    let hook = HandlerPanic::catch(command.on_error(Arc::clone(&ctx), &error))
        .await
        .unwrap_or_else(|panic| Some(Err(panic.into())));

    match hook {
        Some(Ok(())) => {
            trace!(command = ctx.command_name(), "Error hook handled failure");
            return Recovery::Hook;
        }
        Some(Err(hook_error)) => {
            log_failure(&ctx, hook_error.as_ref(), "Error hook failed");
        }
        None => {}
    }

    match fallback(&ctx, message).await {
        Ok(()) => Recovery::Fallback,
        Err(e) => {
            error!(
                command = ctx.command_name(),
                invocation = %ctx.invocation_id(),
                error = %e,
                "Failed to send error message"
            );
            Recovery::FallbackFailed
        }
    }
}

async fn fallback(ctx: &CommandContext, message: &str) -> Result<(), ResponseError> {
    if ctx.is_acknowledged() {
        return ctx.edit_reply(message).await.map(drop);
    }

    match ctx.reply(Reply::ephemeral(message)).await {
        // Acknowledged in the meantime by a late auto-defer.
        Err(ResponseError::AlreadyAcknowledged) => ctx.edit_reply(message).await.map(drop),
        result => result,
    }
}

fn log_failure(ctx: &CommandContext, failure: &(dyn StdError + 'static), what: &str) {
    let chain = source_chain(failure);
    error!(
        command = ctx.command_name(),
        user = %ctx.user_id(),
        invocation = %ctx.invocation_id(),
        error = %failure,
        "{what}"
    );
    if !chain.is_empty() {
        warn!(caused_by = %chain.join(": "), "{what}: error sources");
    }
    trace!(error = ?failure, "{what}: debug representation");
}

fn source_chain(failure: &(dyn StdError + 'static)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut source = failure.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{chat_input, RecordingResponder, ResponderCall, ScriptedCommand, Step};
    use cmdgate_common::test_utils::discord_fixtures;

    const MESSAGE: &str = "Something went wrong.";

    fn context(
        responder: &Arc<RecordingResponder>,
        command: ScriptedCommand,
    ) -> (Arc<CommandContext>, Arc<ScriptedCommand>) {
        let command = Arc::new(command);
        let interaction = chat_input("fails", discord_fixtures::test_user_id(), responder);
        let ctx = CommandContext::build(interaction, command.clone());
        (Arc::new(ctx), command)
    }

    fn failure() -> CommandError {
        "boom".into()
    }

    #[tokio::test]
    async fn test_fallback_replies_ephemerally_when_unacknowledged() {
        let responder = Arc::new(RecordingResponder::new());
        let (ctx, _) = context(&responder, ScriptedCommand::new("fails"));

        let recovery = escalate(ctx.clone(), failure(), MESSAGE).await;

        assert_eq!(recovery, Recovery::Fallback);
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::ephemeral(MESSAGE))]
        );
    }

    #[tokio::test]
    async fn test_fallback_edits_when_deferred() {
        let responder = Arc::new(RecordingResponder::new());
        let (ctx, _) = context(&responder, ScriptedCommand::new("fails"));
        ctx.defer_reply(false).await.unwrap();

        let recovery = escalate(ctx.clone(), failure(), MESSAGE).await;

        assert_eq!(recovery, Recovery::Fallback);
        assert_eq!(
            responder.calls(),
            vec![
                ResponderCall::DeferReply { ephemeral: false },
                ResponderCall::EditReply(MESSAGE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_successful_hook_suppresses_fallback() {
        let responder = Arc::new(RecordingResponder::new());
        let (ctx, command) = context(
            &responder,
            ScriptedCommand::new("fails").with_hook(vec![Step::Reply("custom".into())]),
        );

        let recovery = escalate(ctx.clone(), failure(), MESSAGE).await;

        assert_eq!(recovery, Recovery::Hook);
        assert_eq!(command.hook_runs(), 1);
        assert_eq!(command.last_error().as_deref(), Some("boom"));
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::new("custom"))]
        );
    }

    #[tokio::test]
    async fn test_failing_hook_falls_back() {
        let responder = Arc::new(RecordingResponder::new());
        let (ctx, command) = context(
            &responder,
            ScriptedCommand::new("fails").with_hook(vec![Step::Fail("hook broke".into())]),
        );

        let recovery = escalate(ctx.clone(), failure(), MESSAGE).await;

        assert_eq!(recovery, Recovery::Fallback);
        assert_eq!(command.hook_runs(), 1);
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::ephemeral(MESSAGE))]
        );
    }

    #[tokio::test]
    async fn test_panicking_hook_falls_back() {
        let responder = Arc::new(RecordingResponder::new());
        let (ctx, command) = context(
            &responder,
            ScriptedCommand::new("fails").with_hook(vec![Step::Panic]),
        );

        let recovery = escalate(ctx.clone(), failure(), MESSAGE).await;

        assert_eq!(recovery, Recovery::Fallback);
        assert_eq!(command.hook_runs(), 1);
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::ephemeral(MESSAGE))]
        );
    }

    #[tokio::test]
    async fn test_hook_that_replied_before_failing_gets_edited() {
        let responder = Arc::new(RecordingResponder::new());
        let (ctx, _) = context(
            &responder,
            ScriptedCommand::new("fails").with_hook(vec![
                Step::Reply("partial".into()),
                Step::Fail("hook broke".into()),
            ]),
        );

        escalate(ctx.clone(), failure(), MESSAGE).await;

        assert_eq!(
            responder.calls(),
            vec![
                ResponderCall::Reply(Reply::new("partial")),
                ResponderCall::EditReply(MESSAGE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_fallback_is_swallowed() {
        let responder = Arc::new(RecordingResponder::failing());
        let (ctx, _) = context(&responder, ScriptedCommand::new("fails"));

        let recovery = escalate(ctx.clone(), failure(), MESSAGE).await;

        assert_eq!(recovery, Recovery::FallbackFailed);
        assert_eq!(responder.calls().len(), 1);
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let wrapped = ResponseError::platform(io);
        assert_eq!(source_chain(&wrapped), vec!["disk on fire".to_string()]);
        assert!(source_chain(failure().as_ref()).is_empty());
    }
}

//! Test doubles for the dispatch pipeline.
//!
//! Available to this crate's tests and, behind the `testing` feature, to
//! downstream crates that want to drive a [`Dispatcher`](crate::Dispatcher)
//! without a live gateway connection.

use async_trait::async_trait;
use chrono::Utc;
use cmdgate_common::test_utils::discord_fixtures;
use cmdgate_common::UserId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::command::{AutoDeferType, Command, CommandError, CommandResult};
use crate::context::CommandContext;
use crate::error::ResponseError;
use crate::inhibitor::Inhibitor;
use crate::interaction::{
    ChatInputInteraction, ContextMenuInteraction, ContextMenuTarget, InboundInteraction,
    InteractionMeta, InteractionResponder, InvokingUser, Reply, SentMessage,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A reply-path call observed by [`RecordingResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderCall {
    /// Initial reply.
    Reply(Reply),
    /// Deferral.
    DeferReply {
        /// Whether the loading state was ephemeral.
        ephemeral: bool,
    },
    /// Edit of the initial reply.
    EditReply(String),
    /// Deletion of the initial reply.
    DeleteReply,
    /// Fetch of the initial reply.
    FetchReply,
    /// Follow-up message.
    FollowUp(Reply),
}

/// Responder that records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingResponder {
    calls: Mutex<Vec<ResponderCall>>,
    failing: bool,
    delay: Option<Duration>,
}

impl RecordingResponder {
    /// A responder whose calls all succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A responder whose calls all fail with a platform error. Failed calls
    /// are still recorded.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Sleeps for `delay` before answering each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<ResponderCall> {
        self.calls.lock().clone()
    }

    async fn record(&self, call: ResponderCall) -> Result<(), ResponseError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().push(call);
        if self.failing {
            return Err(ResponseError::platform("recording responder set to fail"));
        }
        Ok(())
    }

    fn message(content: impl Into<String>) -> SentMessage {
        SentMessage {
            id: next_id(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn reply(&self, reply: Reply) -> Result<(), ResponseError> {
        self.record(ResponderCall::Reply(reply)).await
    }

    async fn defer_reply(&self, ephemeral: bool) -> Result<(), ResponseError> {
        self.record(ResponderCall::DeferReply { ephemeral }).await
    }

    async fn edit_reply(&self, content: &str) -> Result<SentMessage, ResponseError> {
        self.record(ResponderCall::EditReply(content.to_string()))
            .await?;
        Ok(Self::message(content))
    }

    async fn delete_reply(&self) -> Result<(), ResponseError> {
        self.record(ResponderCall::DeleteReply).await
    }

    async fn fetch_reply(&self) -> Result<SentMessage, ResponseError> {
        self.record(ResponderCall::FetchReply).await?;
        Ok(Self::message(""))
    }

    async fn follow_up(&self, reply: Reply) -> Result<SentMessage, ResponseError> {
        let content = reply.content().to_string();
        self.record(ResponderCall::FollowUp(reply)).await?;
        Ok(Self::message(content))
    }
}

fn meta(name: &str, user: UserId, guild: bool) -> InteractionMeta {
    InteractionMeta {
        interaction_id: next_id(),
        command_name: name.to_string(),
        user: InvokingUser {
            id: user,
            name: format!("user-{user}"),
        },
        guild_id: guild.then(discord_fixtures::test_guild_id),
        channel_id: discord_fixtures::test_channel_id(),
        created_at: Utc::now(),
        locale: "en-US".to_string(),
    }
}

/// A slash command invocation from the fixture guild and channel.
pub fn chat_input(
    name: &str,
    user: UserId,
    responder: &Arc<RecordingResponder>,
) -> InboundInteraction {
    InboundInteraction::ChatInput(ChatInputInteraction {
        meta: meta(name, user, true),
        options: Vec::new(),
        responder: responder.clone(),
    })
}

/// A slash command invocation from a direct message.
pub fn direct_message(
    name: &str,
    user: UserId,
    responder: &Arc<RecordingResponder>,
) -> InboundInteraction {
    InboundInteraction::ChatInput(ChatInputInteraction {
        meta: meta(name, user, false),
        options: Vec::new(),
        responder: responder.clone(),
    })
}

/// A user context-menu invocation targeting `target`.
pub fn user_context_menu(
    name: &str,
    user: UserId,
    target: UserId,
    responder: &Arc<RecordingResponder>,
) -> InboundInteraction {
    InboundInteraction::ContextMenu(ContextMenuInteraction {
        meta: meta(name, user, true),
        target: ContextMenuTarget::User(target),
        responder: responder.clone(),
    })
}

/// One action of a [`ScriptedCommand`].
#[derive(Debug, Clone)]
pub enum Step {
    /// Sleep on the tokio clock.
    Sleep(Duration),
    /// Send the initial reply.
    Reply(String),
    /// Defer the reply.
    Defer {
        /// Whether the loading state is ephemeral.
        ephemeral: bool,
    },
    /// Edit the initial reply.
    Edit(String),
    /// Return an error with this message.
    Fail(String),
    /// Panic.
    Panic,
}

/// Inhibitor that always vetoes, without replying.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deny;

#[async_trait]
impl Inhibitor for Deny {
    fn name(&self) -> &'static str {
        "deny"
    }

    async fn check(&self, _ctx: &CommandContext) -> bool {
        false
    }
}

/// A command whose handler and error hook follow a fixed script.
pub struct ScriptedCommand {
    name: String,
    cooldown: Option<Duration>,
    auto_defer: Option<AutoDeferType>,
    inhibitors: Vec<Box<dyn Inhibitor>>,
    steps: Vec<Step>,
    hook: Option<Vec<Step>>,
    runs: AtomicUsize,
    hook_runs: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

impl ScriptedCommand {
    /// A command that does nothing and succeeds.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cooldown: None,
            auto_defer: None,
            inhibitors: Vec::new(),
            steps: Vec::new(),
            hook: None,
            runs: AtomicUsize::new(0),
            hook_runs: AtomicUsize::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Sets the per-user cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Sets the auto-defer mode.
    #[must_use]
    pub fn with_auto_defer(mut self, mode: AutoDeferType) -> Self {
        self.auto_defer = Some(mode);
        self
    }

    /// Sets the handler script.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    /// Installs an error hook running `steps`.
    #[must_use]
    pub fn with_hook(mut self, steps: Vec<Step>) -> Self {
        self.hook = Some(steps);
        self
    }

    /// Adds an inhibitor.
    #[must_use]
    pub fn with_inhibitor(mut self, inhibitor: impl Inhibitor + 'static) -> Self {
        self.inhibitors.push(Box::new(inhibitor));
        self
    }

    /// Adds an inhibitor that always vetoes.
    #[must_use]
    pub fn denying(self) -> Self {
        self.with_inhibitor(Deny)
    }

    /// How many times the handler ran.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// How many times the error hook ran.
    pub fn hook_runs(&self) -> usize {
        self.hook_runs.load(Ordering::SeqCst)
    }

    /// Message of the last error passed to the hook.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

async fn play(ctx: &CommandContext, steps: &[Step]) -> CommandResult {
    for step in steps {
        match step {
            Step::Sleep(duration) => tokio::time::sleep(*duration).await,
            Step::Reply(content) => ctx.reply(content.as_str()).await?,
            Step::Defer { ephemeral } => ctx.defer_reply(*ephemeral).await?,
            Step::Edit(content) => {
                ctx.edit_reply(content).await?;
            }
            Step::Fail(message) => return Err(message.clone().into()),
            Step::Panic => panic!("scripted panic"),
        }
    }
    Ok(())
}

#[async_trait]
impl Command for ScriptedCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn cooldown(&self) -> Option<Duration> {
        self.cooldown
    }

    fn auto_defer(&self) -> Option<AutoDeferType> {
        self.auto_defer
    }

    fn inhibitors(&self) -> &[Box<dyn Inhibitor>] {
        &self.inhibitors
    }

    async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult {
        self.runs.fetch_add(1, Ordering::SeqCst);
        play(&ctx, &self.steps).await
    }

    async fn on_error(
        &self,
        ctx: Arc<CommandContext>,
        error: &CommandError,
    ) -> Option<CommandResult> {
        let steps = self.hook.as_ref()?;
        self.hook_runs.fetch_add(1, Ordering::SeqCst);
        *self.last_error.lock() = Some(error.to_string());
        Some(play(&ctx, steps).await)
    }
}

impl std::fmt::Debug for ScriptedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedCommand")
            .field("name", &self.name)
            .field("cooldown", &self.cooldown)
            .field("auto_defer", &self.auto_defer)
            .field("steps", &self.steps)
            .field("hook", &self.hook)
            .finish_non_exhaustive()
    }
}

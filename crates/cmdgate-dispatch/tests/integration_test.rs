//! Integration tests for cmdgate-dispatch.
//!
//! These drive the dispatcher through its public API only, with a command and
//! a responder defined here the way a host crate would define them.

use async_trait::async_trait;
use chrono::Utc;
use cmdgate_common::test_utils::{discord_fixtures, init_test_logging};
use cmdgate_common::UserId;
use cmdgate_config::{Config, ConfigCache};
use cmdgate_dispatch::{
    ChatInputInteraction, Command, CommandContext, CommandOption, CommandRegistry, CommandResult,
    DispatchOutcome, Dispatcher, InboundInteraction, InteractionMeta, InteractionResponder,
    InvokingUser, ManualClock, OptionValue, Reply, ResponseError, SentMessage,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Transcript {
    messages: Mutex<Vec<String>>,
}

impl Transcript {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl InteractionResponder for Transcript {
    async fn reply(&self, reply: Reply) -> Result<(), ResponseError> {
        self.messages.lock().push(reply.content().to_string());
        Ok(())
    }

    async fn defer_reply(&self, _ephemeral: bool) -> Result<(), ResponseError> {
        self.messages.lock().push("<deferred>".to_string());
        Ok(())
    }

    async fn edit_reply(&self, content: &str) -> Result<SentMessage, ResponseError> {
        self.messages.lock().push(content.to_string());
        Ok(SentMessage {
            id: 1,
            content: content.to_string(),
        })
    }

    async fn delete_reply(&self) -> Result<(), ResponseError> {
        Ok(())
    }

    async fn fetch_reply(&self) -> Result<SentMessage, ResponseError> {
        Err(ResponseError::platform("not supported"))
    }

    async fn follow_up(&self, reply: Reply) -> Result<SentMessage, ResponseError> {
        self.reply(reply.clone()).await?;
        Ok(SentMessage {
            id: 2,
            content: reply.content().to_string(),
        })
    }
}

/// Echoes its `text` option `count` times.
struct Echo;

#[async_trait]
impl Command for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn cooldown(&self) -> Option<Duration> {
        Some(Duration::from_secs(10))
    }

    async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult {
        let text = ctx
            .arguments()
            .get_string("text")
            .ok_or("missing text option")?
            .to_string();
        let count = ctx.arguments().get_integer("count").unwrap_or(1);

        ctx.reply(text.clone()).await?;
        for _ in 1..count {
            ctx.follow_up(text.clone()).await?;
        }
        Ok(())
    }
}

fn echo_interaction(
    user: UserId,
    options: Vec<CommandOption>,
    responder: &Arc<Transcript>,
) -> InboundInteraction {
    InboundInteraction::ChatInput(ChatInputInteraction {
        meta: InteractionMeta {
            interaction_id: 1,
            command_name: "echo".to_string(),
            user: InvokingUser {
                id: user,
                name: "tester".to_string(),
            },
            guild_id: Some(discord_fixtures::test_guild_id()),
            channel_id: discord_fixtures::test_channel_id(),
            created_at: Utc::now(),
            locale: "en-US".to_string(),
        },
        options,
        responder: responder.clone(),
    })
}

fn dispatcher() -> Dispatcher {
    init_test_logging();
    let registry = Arc::new(CommandRegistry::new());
    registry.register(Arc::new(Echo));
    Dispatcher::builder(registry, Arc::new(ConfigCache::new(Config::default())))
        .clock(Arc::new(ManualClock::new(1_700_000_000_000)))
        .build()
}

#[tokio::test]
async fn test_command_reads_its_options() {
    let dispatcher = dispatcher();
    let responder = Arc::new(Transcript::default());
    let options = vec![
        CommandOption::new("text", OptionValue::String("hi".to_string())),
        CommandOption::new("count", OptionValue::Integer(3)),
    ];

    let outcome = dispatcher
        .dispatch(echo_interaction(discord_fixtures::test_user_id(), options, &responder))
        .await;

    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(responder.messages(), vec!["hi", "hi", "hi"]);
}

#[tokio::test]
async fn test_missing_option_surfaces_generic_error() {
    let dispatcher = dispatcher();
    let responder = Arc::new(Transcript::default());

    let outcome = dispatcher
        .dispatch(echo_interaction(discord_fixtures::test_user_id(), Vec::new(), &responder))
        .await;

    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    assert_eq!(
        responder.messages(),
        vec!["Something went wrong while running this command."]
    );
}

#[tokio::test]
async fn test_concurrent_users_share_one_dispatcher() {
    let dispatcher = Arc::new(dispatcher());
    let users = discord_fixtures::test_user_ids(20);

    let mut handles = Vec::new();
    for user in users {
        let dispatcher = Arc::clone(&dispatcher);
        handles.push(tokio::spawn(async move {
            let responder = Arc::new(Transcript::default());
            let options = vec![CommandOption::new("text", OptionValue::String("hey".to_string()))];
            dispatcher
                .dispatch(echo_interaction(user, options, &responder))
                .await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), DispatchOutcome::Completed);
    }

    dispatcher.cooldowns().run_pending_tasks();
    assert_eq!(dispatcher.cooldowns().active_windows(), 20);
}

#[tokio::test]
async fn test_same_user_is_throttled_across_dispatches() {
    let dispatcher = dispatcher();
    let user = discord_fixtures::test_user_id();
    let options = || vec![CommandOption::new("text", OptionValue::String("x".to_string()))];

    let first = Arc::new(Transcript::default());
    let second = Arc::new(Transcript::default());

    dispatcher
        .dispatch(echo_interaction(user, options(), &first))
        .await;
    let outcome = dispatcher
        .dispatch(echo_interaction(user, options(), &second))
        .await;

    assert_eq!(outcome, DispatchOutcome::Throttled { remaining_secs: 10 });
    assert_eq!(
        second.messages(),
        vec!["Please wait 10 more second(s) before reusing the echo command."]
    );
}

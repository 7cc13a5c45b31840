//! Integration tests for cmdgate-bot crate.
//!
//! These run the built-in commands through the same dispatcher the bot
//! builds at startup, with recorded responses instead of a gateway.

use cmdgate_bot::CmdGateBot;
use cmdgate_common::test_utils::{discord_fixtures, init_test_logging};
use cmdgate_config::Config;
use cmdgate_dispatch::testing::{chat_input, RecordingResponder, ResponderCall};
use cmdgate_dispatch::{DispatchOutcome, Reply};
use std::sync::Arc;

fn bot() -> CmdGateBot {
    init_test_logging();
    let mut config = Config::default();
    config.discord.token = "test_token".to_string();
    config.dispatch.unknown_command_message = true;
    CmdGateBot::new(config)
}

#[tokio::test]
async fn test_ping_then_cooldown() {
    let dispatcher = bot().dispatcher();
    let user = discord_fixtures::test_user_id();

    let first = Arc::new(RecordingResponder::new());
    let outcome = dispatcher.dispatch(chat_input("ping", user, &first)).await;
    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(
        first.calls(),
        vec![ResponderCall::Reply(Reply::new(
            "Pong! Gateway latency is not known yet."
        ))]
    );

    let second = Arc::new(RecordingResponder::new());
    let outcome = dispatcher.dispatch(chat_input("ping", user, &second)).await;
    assert!(matches!(outcome, DispatchOutcome::Throttled { remaining_secs } if remaining_secs <= 3));
    assert!(matches!(
        &second.calls()[..],
        [ResponderCall::Reply(reply)] if reply.is_ephemeral() && reply.content().contains("ping command")
    ));
}

#[tokio::test]
async fn test_about_lists_all_commands() {
    let dispatcher = bot().dispatcher();
    let responder = Arc::new(RecordingResponder::new());

    dispatcher
        .dispatch(chat_input("about", discord_fixtures::test_user_id(), &responder))
        .await;

    assert!(matches!(
        &responder.calls()[..],
        [ResponderCall::Reply(reply)]
            if reply.content().ends_with("Commands: User Info, about, ping, uptime")
    ));
}

#[tokio::test(start_paused = true)]
async fn test_fast_uptime_is_not_deferred() {
    let dispatcher = bot().dispatcher();
    let responder = Arc::new(RecordingResponder::new());

    let outcome = dispatcher
        .dispatch(chat_input("uptime", discord_fixtures::test_user_id(), &responder))
        .await;
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;

    assert_eq!(outcome, DispatchOutcome::Completed);
    let calls = responder.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], ResponderCall::Reply(reply) if reply.is_ephemeral()));
}

#[tokio::test]
async fn test_unknown_command_reply_follows_config_updates() {
    let bot = bot();
    let dispatcher = bot.dispatcher();

    let mut updated = (*bot.config().get()).clone();
    updated.responses.not_found = "Nope.".to_string();
    bot.config().update(updated).unwrap();

    let responder = Arc::new(RecordingResponder::new());
    let outcome = dispatcher
        .dispatch(chat_input("missing", discord_fixtures::test_user_id(), &responder))
        .await;

    assert_eq!(outcome, DispatchOutcome::UnknownCommand { notified: true });
    assert_eq!(
        responder.calls(),
        vec![ResponderCall::Reply(Reply::ephemeral("Nope."))]
    );
}

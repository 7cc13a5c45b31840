//! Built-in commands and their Discord registration payloads.

pub mod about;
pub mod ping;
pub mod uptime;
pub mod user_info;

use chrono::{DateTime, Utc};
use cmdgate_dispatch::{CommandContext, CommandRegistry, LatencyProbe, Reply, ResponseError};
use serenity::all::CreateCommand;
use std::sync::Arc;

/// Builds the registry of built-in commands.
pub fn build_registry(latency: Arc<dyn LatencyProbe>, started_at: DateTime<Utc>) -> CommandRegistry {
    let registry = CommandRegistry::new();
    registry.register(Arc::new(ping::Ping::new(latency)));
    registry.register(Arc::new(uptime::Uptime::new(started_at)));
    registry.register(Arc::new(user_info::UserInfo::new()));

    let mut names = registry.names();
    names.push(about::NAME.to_string());
    names.sort();
    registry.register(Arc::new(about::About::new(names)));

    registry
}

/// Registration payloads for every built-in command.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        about::definition(),
        ping::definition(),
        uptime::definition(),
        user_info::definition(),
    ]
}

/// Sends `reply`, or edits it in when the interaction was already
/// acknowledged (for example by auto-defer).
pub(crate) async fn respond(ctx: &CommandContext, reply: Reply) -> Result<(), ResponseError> {
    if ctx.is_acknowledged() {
        return ctx.edit_reply(reply.content()).await.map(drop);
    }

    match ctx.reply(reply.clone()).await {
        Err(ResponseError::AlreadyAcknowledged) => ctx.edit_reply(reply.content()).await.map(drop),
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgate_dispatch::{CommandLookup, SharedLatency};

    #[test]
    fn test_registry_holds_every_definition() {
        let registry = build_registry(Arc::new(SharedLatency::new()), Utc::now());
        assert_eq!(registry.len(), definitions().len());
        assert_eq!(
            registry.names(),
            vec!["User Info", "about", "ping", "uptime"]
        );
        assert!(registry.resolve("ping").is_some());
    }
}

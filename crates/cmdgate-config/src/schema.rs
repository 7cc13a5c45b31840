//! Configuration schema definitions using serde.

use cmdgate_common::{render_template, CmdGateError, GuildId};
use serde::{Deserialize, Serialize};

use crate::validator::ConfigValidator;

/// Main configuration structure for CmdGate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Dispatch engine configuration.
    pub dispatch: DispatchConfig,
    /// User-visible response templates.
    pub responses: ResponsesConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Development guild. When set, commands are registered to this guild
    /// only instead of globally.
    pub dev_guild_id: Option<GuildId>,
}

/// Dispatch engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Whether to reply to interactions for commands that are not registered.
    pub unknown_command_message: bool,
    /// Time budget in milliseconds before an auto-deferred command is
    /// acknowledged. The gateway latency is subtracted from it.
    pub auto_defer_budget_ms: u64,
}

/// Response templates shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsesConfig {
    /// Reply for unknown commands.
    pub not_found: String,
    /// Reply for throttled commands. Supports `{time}` and `{name}`.
    pub cooldown: String,
    /// Fallback reply when a command fails.
    pub error: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
    /// Emit JSON formatted logs.
    pub json: bool,
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), CmdGateError> {
        ConfigValidator::validate(self)
    }
}

impl ResponsesConfig {
    /// Renders the cooldown reply for `command_name` with `remaining_secs` left.
    pub fn cooldown_message(&self, remaining_secs: u64, command_name: &str) -> String {
        let name = format!("{command_name} command");
        render_template(
            &self.cooldown,
            &[("time", &remaining_secs.to_string()), ("name", &name)],
        )
    }
}

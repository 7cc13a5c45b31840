//! Default configuration values.

use crate::schema::{Config, DiscordConfig, DispatchConfig, LoggingConfig, ResponsesConfig};

/// Default auto-defer budget. Discord invalidates interactions that are not
/// acknowledged within three seconds.
pub const DEFAULT_AUTO_DEFER_BUDGET_MS: u64 = 2500;

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig::default(),
            dispatch: DispatchConfig::default(),
            responses: ResponsesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            dev_guild_id: None,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            unknown_command_message: false,
            auto_defer_budget_ms: DEFAULT_AUTO_DEFER_BUDGET_MS,
        }
    }
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            not_found: "This command could not be found.".to_string(),
            cooldown: "Please wait {time} more second(s) before reusing the {name}.".to_string(),
            error: "Something went wrong while running this command.".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,cmdgate_dispatch=debug".to_string(),
            json: false,
        }
    }
}

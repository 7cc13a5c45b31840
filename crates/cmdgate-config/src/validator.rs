//! Runtime validation of loaded configuration.

use crate::schema::Config;
use cmdgate_common::{CmdGateError, Result};

/// Hard upper bound for the auto-defer budget; Discord's own deadline.
pub const MAX_AUTO_DEFER_BUDGET_MS: u64 = 3000;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration.
    pub fn validate(config: &Config) -> Result<()> {
        if config.discord.token.trim().is_empty() {
            return Err(CmdGateError::Config(
                "Discord token cannot be empty".to_string(),
            ));
        }

        if config.discord.dev_guild_id.is_some_and(|guild| guild.0 == 0) {
            return Err(CmdGateError::Config(
                "dev_guild_id must be a non-zero guild id".to_string(),
            ));
        }

        Self::validate_dispatch(config)
    }

    /// Validates everything the dispatch engine reads, without requiring
    /// Discord credentials.
    pub fn validate_dispatch(config: &Config) -> Result<()> {
        let dispatch = &config.dispatch;
        if dispatch.auto_defer_budget_ms > MAX_AUTO_DEFER_BUDGET_MS {
            return Err(CmdGateError::Config(format!(
                "auto_defer_budget_ms must be at most {MAX_AUTO_DEFER_BUDGET_MS}, got {}",
                dispatch.auto_defer_budget_ms
            )));
        }

        let responses = &config.responses;
        for (key, value) in [
            ("not_found", &responses.not_found),
            ("cooldown", &responses.cooldown),
            ("error", &responses.error),
        ] {
            if value.trim().is_empty() {
                return Err(CmdGateError::Config(format!(
                    "responses.{key} cannot be empty"
                )));
            }
        }

        Ok(())
    }
}

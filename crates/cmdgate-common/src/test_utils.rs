//! Test utilities and shared test helpers for CmdGate.
//!
//! This module provides common testing utilities, fixtures, and helper functions
//! that can be used across all crates in the workspace for unit and integration testing.

use std::sync::Once;

#[cfg(feature = "tracing-subscriber")]
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
#[cfg(feature = "tracing-subscriber")]
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// No-op version when tracing-subscriber is not available
#[cfg(not(feature = "tracing-subscriber"))]
pub fn init_test_logging() {
    INIT.call_once(|| {});
}

/// Discord-related test utilities.
pub mod discord_fixtures {
    use crate::{ChannelId, GuildId, UserId};

    /// Create a test channel ID.
    pub const fn test_channel_id() -> ChannelId {
        ChannelId(123_456_789_012_345_678)
    }

    /// Create a test guild ID.
    pub const fn test_guild_id() -> GuildId {
        GuildId(555_555_555_555_555_555)
    }

    /// Create a test user ID.
    pub const fn test_user_id() -> UserId {
        UserId(987_654_321_098_765_432)
    }

    /// Create multiple test user IDs.
    pub fn test_user_ids(count: usize) -> Vec<UserId> {
        (0..count as u64)
            .map(|i| UserId(100_000_000_000_000_000 + i))
            .collect()
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as TOML string.
    pub const fn minimal_config_toml() -> &'static str {
        r#"
[discord]
token = "test_token"

[dispatch]
unknown_command_message = true
"#
    }

    /// Create a full test configuration as YAML string.
    pub const fn full_config_yaml() -> &'static str {
        concat!(
            "discord:\n",
            "  token: \"test_token_full\"\n",
            "  dev_guild_id: 555555555555555555\n",
            "\n",
            "dispatch:\n",
            "  unknown_command_message: false\n",
            "  auto_defer_budget_ms: 2000\n",
            "\n",
            "responses:\n",
            "  not_found: \"Unknown command.\"\n",
            "  cooldown: \"Slow down! {time}s left on the {name}.\"\n",
            "  error: \"Oops.\"\n",
            "\n",
            "logging:\n",
            "  filter: \"warn\"\n",
            "  json: true\n"
        )
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use crate::UserId;
    use proptest::prelude::*;

    /// Strategy for generating valid Discord user IDs.
    pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
        (100_000_000_000_000_000u64..=999_999_999_999_999_999u64).prop_map(UserId)
    }

    /// Strategy for generating valid slash command names.
    pub fn command_name_strategy() -> impl Strategy<Value = String> {
        r"[a-z][a-z0-9_-]{0,31}"
    }
}

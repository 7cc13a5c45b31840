//! Command descriptors as seen by the dispatcher.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::context::CommandContext;
use crate::inhibitor::Inhibitor;

/// Error type returned by command handlers and error hooks.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Result of running a command handler or error hook.
pub type CommandResult = Result<(), CommandError>;

/// How a command is acknowledged when its handler is slow to respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoDeferType {
    /// Defer with a loading state only the invoking user can see.
    Ephemeral,
    /// Defer with a loading state visible in the channel.
    Normal,
    /// Defer as an update. Command interactions have no message to update,
    /// so this behaves like [`AutoDeferType::Normal`].
    Update,
}

impl AutoDeferType {
    /// Whether the deferred reply is ephemeral.
    pub const fn is_ephemeral(self) -> bool {
        matches!(self, Self::Ephemeral)
    }
}

/// A registered command.
///
/// Only [`name`](Command::name) and [`run`](Command::run) are required; the
/// remaining methods default to "no cooldown, no auto-defer, no inhibitors, no
/// error hook".
///
/// # Example
///
/// ```ignore
/// struct Ping;
///
/// #[async_trait]
/// impl Command for Ping {
///     fn name(&self) -> &str {
///         "ping"
///     }
///
///     fn cooldown(&self) -> Option<Duration> {
///         Some(Duration::from_secs(3))
///     }
///
///     async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult {
///         ctx.reply("Pong!").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// Unique command name.
    fn name(&self) -> &str;

    /// Per-user cooldown between invocations.
    fn cooldown(&self) -> Option<Duration> {
        None
    }

    /// Automatic acknowledgment mode for slow handlers.
    fn auto_defer(&self) -> Option<AutoDeferType> {
        None
    }

    /// Inhibitors consulted by the default [`inhibit`](Command::inhibit).
    fn inhibitors(&self) -> &[Box<dyn Inhibitor>] {
        &[]
    }

    /// Decides whether the command may run. Returning `false` ends the
    /// dispatch silently; any message to the user is the inhibitor's job.
    async fn inhibit(&self, ctx: &CommandContext) -> bool {
        for inhibitor in self.inhibitors() {
            if !inhibitor.check(ctx).await {
                debug!(
                    command = self.name(),
                    inhibitor = inhibitor.name(),
                    "Command inhibited"
                );
                return false;
            }
        }
        true
    }

    /// Runs the command.
    async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult;

    /// Custom error hook. `None` means the command has no hook and the
    /// dispatcher's generic error message is used.
    async fn on_error(
        &self,
        _ctx: Arc<CommandContext>,
        _error: &CommandError,
    ) -> Option<CommandResult> {
        None
    }
}

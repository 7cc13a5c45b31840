//! Automatic deferral of slow command handlers.
//!
//! The platform only accepts an initial acknowledgment within a short window
//! after the interaction is created. When a command opts into auto-defer, a
//! timer is started alongside its handler; if the handler has not replied or
//! deferred by the time it fires, the interaction is deferred on its behalf.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn, Instrument, Span};

use crate::command::AutoDeferType;
use crate::context::CommandContext;
use crate::error::ResponseError;
use crate::latency::LatencyProbe;

/// Delay before auto-deferring: the budget minus the current round-trip
/// latency, never negative. An unknown latency leaves the budget untouched.
pub fn defer_delay(budget: Duration, latency: Option<Duration>) -> Duration {
    latency.map_or(budget, |latency| budget.saturating_sub(latency))
}

/// Starts auto-defer timers.
#[derive(Clone)]
pub struct AutoDeferScheduler {
    budget: Duration,
    latency: Arc<dyn LatencyProbe>,
}

impl AutoDeferScheduler {
    /// Creates a scheduler deferring `budget` minus the probe's latency after start.
    pub fn new(budget: Duration, latency: Arc<dyn LatencyProbe>) -> Self {
        Self { budget, latency }
    }

    /// Delay a timer started now would wait.
    pub fn current_delay(&self) -> Duration {
        defer_delay(self.budget, self.latency.round_trip())
    }

    /// Starts a timer deferring `ctx` in `mode` unless cancelled first.
    ///
    /// The timer never overrides an acknowledgment the handler already made;
    /// the context rejects the defer and the timer backs off quietly.
    pub fn schedule(&self, ctx: Arc<CommandContext>, mode: AutoDeferType) -> AutoDeferGuard {
        let token = CancellationToken::new();
        let delay = self.current_delay();
        trace!(?delay, ?mode, "Scheduling auto-defer");

        let child = token.clone();
        let timer = async move {
            tokio::select! {
                biased;
                () = child.cancelled() => {
                    trace!("Auto-defer cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    if child.is_cancelled() || ctx.is_acknowledged() {
                        return;
                    }
                    match ctx.defer_reply(mode.is_ephemeral()).await {
                        Ok(()) => debug!(
                            command = ctx.command_name(),
                            invocation = %ctx.invocation_id(),
                            "Auto-deferred slow command"
                        ),
                        Err(ResponseError::AlreadyAcknowledged) => {
                            debug!("Handler acknowledged before auto-defer");
                        }
                        Err(e) => warn!(
                            command = ctx.command_name(),
                            error = %e,
                            "Auto-defer failed"
                        ),
                    }
                }
            }
        };
        tokio::spawn(timer.instrument(Span::current()));

        AutoDeferGuard { token }
    }
}

impl std::fmt::Debug for AutoDeferScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoDeferScheduler")
            .field("budget", &self.budget)
            .field("latency", &self.latency.round_trip())
            .finish()
    }
}

/// Handle to a running auto-defer timer. Dropping it cancels the timer.
#[derive(Debug)]
pub struct AutoDeferGuard {
    token: CancellationToken,
}

impl AutoDeferGuard {
    /// Cancels the timer. Safe to call more than once.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the timer was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for AutoDeferGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

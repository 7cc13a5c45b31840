//! The dispatch pipeline.

use cmdgate_config::{Config, ConfigCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, field, info_span, warn, Instrument, Span};

use crate::auto_defer::AutoDeferScheduler;
use crate::clock::{Clock, SystemClock};
use crate::command::CommandError;
use crate::context::CommandContext;
use crate::cooldown::CooldownTracker;
use crate::error::HandlerPanic;
use crate::escalation::{escalate, Recovery};
use crate::interaction::{InboundInteraction, Reply};
use crate::latency::{LatencyProbe, SharedLatency};
use crate::registry::CommandLookup;

/// Terminal state reached by one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No command is registered under the invoked name.
    UnknownCommand {
        /// Whether the user was told.
        notified: bool,
    },
    /// The user is on cooldown for this command.
    Throttled {
        /// Whole seconds left, rounded up.
        remaining_secs: u64,
    },
    /// An inhibitor vetoed the command.
    Inhibited,
    /// The handler succeeded.
    Completed,
    /// The handler failed and the failure was escalated.
    Failed {
        /// How the failure was surfaced to the user.
        recovery: Recovery,
    },
}

/// Turns inbound interactions into command invocations.
///
/// One `Dispatcher` serves every interaction of a client. It owns the
/// cooldown table and reads configuration from a shared [`ConfigCache`]
/// on each dispatch, so updated response strings and defer budgets apply to
/// the next interaction.
pub struct Dispatcher {
    lookup: Arc<dyn CommandLookup>,
    config: Arc<ConfigCache>,
    cooldowns: CooldownTracker,
    latency: Arc<dyn LatencyProbe>,
}

impl Dispatcher {
    /// Starts building a dispatcher.
    pub fn builder(lookup: Arc<dyn CommandLookup>, config: Arc<ConfigCache>) -> DispatcherBuilder {
        DispatcherBuilder::new(lookup, config)
    }

    /// The cooldown table.
    pub const fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// The configuration cache read on each dispatch.
    pub const fn config(&self) -> &Arc<ConfigCache> {
        &self.config
    }

    /// Handles one inbound interaction to completion.
    ///
    /// Never fails: every failure is recovered locally, escalated to the user,
    /// or logged, and the terminal state is reported as a [`DispatchOutcome`].
    pub async fn dispatch(&self, interaction: InboundInteraction) -> DispatchOutcome {
        let span = info_span!(
            "dispatch",
            command = %interaction.command_name(),
            user = %interaction.meta().user.id,
            kind = interaction.kind(),
            invocation = field::Empty,
        );
        self.run_pipeline(interaction).instrument(span).await
    }

    async fn run_pipeline(&self, interaction: InboundInteraction) -> DispatchOutcome {
        let config = self.config.get();

        let Some(command) = self.lookup.resolve(interaction.command_name()) else {
            return Self::unknown_command(&interaction, &config).await;
        };

        let user = interaction.meta().user.id;
        if let Some(remaining_secs) = self.cooldowns.check(user, command.as_ref()) {
            let message = config
                .responses
                .cooldown_message(remaining_secs, command.name());
            if let Err(e) = interaction
                .responder()
                .reply(Reply::ephemeral(message))
                .await
            {
                warn!(error = %e, "Failed to send cooldown message");
            }
            return DispatchOutcome::Throttled { remaining_secs };
        }

        let ctx = Arc::new(CommandContext::build(interaction, Arc::clone(&command)));
        Span::current().record("invocation", field::display(ctx.invocation_id()));

        let allowed = HandlerPanic::catch(command.inhibit(&ctx)).await;
        let allowed = match allowed {
            Ok(allowed) => allowed,
            Err(panic) => {
                let recovery = escalate(ctx, panic.into(), &config.responses.error).await;
                return DispatchOutcome::Failed { recovery };
            }
        };
        if !allowed {
            debug!("Command was inhibited");
            return DispatchOutcome::Inhibited;
        }

        let scheduler = AutoDeferScheduler::new(
            Duration::from_millis(config.dispatch.auto_defer_budget_ms),
            Arc::clone(&self.latency),
        );
        let timer = command
            .auto_defer()
            .map(|mode| scheduler.schedule(Arc::clone(&ctx), mode));

        let result = HandlerPanic::catch(command.run(Arc::clone(&ctx)))
            .await
            .unwrap_or_else(|panic| Err(CommandError::from(panic)));

        if let Some(timer) = timer {
            timer.cancel();
        }

        match result {
            Ok(()) => {
                debug!(
                    replied = ctx.replied(),
                    deferred = ctx.deferred(),
                    "Command completed"
                );
                DispatchOutcome::Completed
            }
            Err(error) => {
                let recovery = escalate(ctx, error, &config.responses.error).await;
                DispatchOutcome::Failed { recovery }
            }
        }
    }

    async fn unknown_command(interaction: &InboundInteraction, config: &Config) -> DispatchOutcome {
        if !config.dispatch.unknown_command_message {
            debug!("Ignoring unknown command");
            return DispatchOutcome::UnknownCommand { notified: false };
        }

        debug!("Replying to unknown command");
        let reply = Reply::ephemeral(config.responses.not_found.clone());
        let notified = match interaction.responder().reply(reply).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to send unknown command message");
                false
            }
        };
        DispatchOutcome::UnknownCommand { notified }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("cooldowns", &self.cooldowns)
            .field("latency", &self.latency.round_trip())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    lookup: Arc<dyn CommandLookup>,
    config: Arc<ConfigCache>,
    latency: Option<Arc<dyn LatencyProbe>>,
    clock: Option<Arc<dyn Clock>>,
}

impl DispatcherBuilder {
    /// Creates a builder resolving commands through `lookup`.
    pub fn new(lookup: Arc<dyn CommandLookup>, config: Arc<ConfigCache>) -> Self {
        Self {
            lookup,
            config,
            latency: None,
            clock: None,
        }
    }

    /// Sets the gateway latency source. Without one the full defer budget is used.
    #[must_use]
    pub fn latency(mut self, latency: Arc<dyn LatencyProbe>) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Sets the clock used for cooldowns.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> Dispatcher {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let latency = self
            .latency
            .unwrap_or_else(|| Arc::new(SharedLatency::new()));

        Dispatcher {
            lookup: self.lookup,
            config: self.config,
            cooldowns: CooldownTracker::with_clock(clock),
            latency,
        }
    }
}

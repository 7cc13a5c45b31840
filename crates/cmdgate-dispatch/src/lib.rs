//! # CmdGate Dispatch
//!
//! The interaction dispatch engine. One inbound interaction goes in, exactly one
//! outcome comes out: a reply or edit from the command, a custom error hook's
//! response, a generic fallback message, or a silently logged internal failure.
//!
//! The pipeline is registry lookup, cooldown check, inhibitor check, context
//! construction, the auto-defer race against the handler, and error escalation.
//! See [`Dispatcher::dispatch`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod auto_defer;
pub mod clock;
pub mod command;
pub mod context;
pub mod cooldown;
pub mod dispatcher;
pub mod error;
pub mod escalation;
pub mod inhibitor;
pub mod interaction;
pub mod latency;
pub mod registry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use auto_defer::{defer_delay, AutoDeferGuard, AutoDeferScheduler};
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{AutoDeferType, Command, CommandError, CommandResult};
pub use context::CommandContext;
pub use cooldown::CooldownTracker;
pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use error::{HandlerPanic, ResponseError};
pub use escalation::Recovery;
pub use inhibitor::{ChannelOnly, GuildOnly, Inhibitor, UserOnly};
pub use interaction::{
    ChatInputInteraction, CommandArguments, CommandOption, ContextMenuInteraction,
    ContextMenuTarget, InboundInteraction, InteractionMeta, InteractionResponder, InvokingUser,
    OptionValue, Reply, SentMessage,
};
pub use latency::{LatencyProbe, SharedLatency};
pub use registry::{CommandLookup, CommandRegistry};

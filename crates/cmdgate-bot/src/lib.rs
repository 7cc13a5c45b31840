//! # CmdGate Bot
//!
//! Discord host for the CmdGate dispatch engine.
//!
//! This crate owns no dispatch policy. It connects to the gateway through
//! serenity, registers the built-in commands, converts incoming command
//! interactions into [`cmdgate_dispatch::InboundInteraction`]s and hands them
//! to the [`cmdgate_dispatch::Dispatcher`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod commands;
pub mod error;
pub mod handler;
pub mod latency;
pub mod logging;
pub mod responder;

pub use bot::*;
pub use error::*;

//! Error types for the reply path.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use thiserror::Error;

/// Errors returned by reply-path operations on a [`CommandContext`](crate::CommandContext)
/// or an [`InteractionResponder`](crate::InteractionResponder).
#[derive(Error, Debug)]
pub enum ResponseError {
    /// The interaction was already replied to or deferred.
    #[error("interaction has already been acknowledged")]
    AlreadyAcknowledged,

    /// The operation needs an initial reply or defer first.
    #[error("interaction has not been replied to or deferred yet")]
    NotAcknowledged,

    /// The platform rejected the request.
    #[error("platform request failed: {0}")]
    Platform(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ResponseError {
    /// Wraps a platform error.
    pub fn platform(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Platform(error.into())
    }
}

/// A command handler, error hook or inhibitor panicked. The panic is caught
/// by the dispatcher and escalated like any other handler failure.
#[derive(Error, Debug)]
#[error("command handler panicked: {0}")]
pub struct HandlerPanic(pub String);

impl HandlerPanic {
    /// Builds the error from a caught panic payload.
    pub fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self(message)
    }

    /// Polls `future` to completion, catching a panic raised while polling.
    pub(crate) async fn catch<F: Future>(future: F) -> Result<F::Output, Self> {
        AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .map_err(|payload| Self::from_payload(payload.as_ref()))
    }
}

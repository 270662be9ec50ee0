//! Error types for Ensayo
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Failure taxonomy of a `run` call:
//!
//! - A body failure (`control` or `candidate` returning `Err`) is captured
//!   into the observation and only surfaces to the caller when the failing
//!   observation is the one selected as the return value. It is re-raised
//!   unchanged as [`RunError::Body`].
//! - A publish sink failure surfaces as [`RunError::Publish`]; both
//!   observations were already captured when it occurs.
//! - A missing required hook (`name`, `enabled`, `control`, `candidate`) is
//!   a compile error, not a runtime one: the trait declares those methods
//!   without defaults, so an incomplete experiment does not build.
//! - Panics inside a body are outside the expected-failure domain and
//!   propagate immediately; the harness does not catch them.

use thiserror::Error;

/// Errors surfaced to the caller of [`Experiment::run`](crate::Experiment::run).
///
/// `E` is the experiment's own error type; a [`RunError::Body`] carries the
/// selected observation's captured error with its message and source chain
/// intact, exactly as if the harness were not present.
#[derive(Debug, Error)]
pub enum RunError<E: std::error::Error> {
    /// The selected code path failed; its original error, unchanged.
    #[error(transparent)]
    Body(E),

    /// The publish sink failed after both code paths completed.
    #[error("publish sink failed: {0}")]
    Publish(anyhow::Error),
}

impl<E: std::error::Error> RunError<E> {
    /// Check whether this is a captured body failure.
    #[must_use]
    pub const fn is_body(&self) -> bool {
        matches!(self, Self::Body(_))
    }

    /// Check whether this is a publish sink failure.
    #[must_use]
    pub const fn is_publish(&self) -> bool {
        matches!(self, Self::Publish(_))
    }

    /// Extract the captured body error, if that is what this is.
    #[must_use]
    pub fn into_body(self) -> Option<E> {
        match self {
            Self::Body(error) => Some(error),
            Self::Publish(_) => None,
        }
    }

    /// Borrow the publish sink error, if that is what this is.
    #[must_use]
    pub fn publish_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Body(_) => None,
            Self::Publish(error) => Some(error),
        }
    }
}

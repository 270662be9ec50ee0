//! Observation - captured execution of one code path
//!
//! An observation wraps a single invocation of a control or candidate body
//! and records what came out of it: the value on success, the error on
//! failure, and the wall-clock duration either way. Once constructed it
//! never changes, so it can be handed to comparison and publishing code
//! without any further coordination.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::experiment::Experiment;

/// Name of the control observation.
pub const CONTROL: &str = "control";

/// Name of the candidate observation.
pub const CANDIDATE: &str = "candidate";

/// Immutable record of one executed body: value or error, plus timing.
///
/// Exactly one of `value`/`error` is set, decided by the body's `Result`.
/// Duration is always recorded, success or failure. Construction via
/// [`Observation::capture`] is the only mutation window.
///
/// Panics inside the body are not captured; they are fatal faults above the
/// expected-failure boundary and propagate to the caller.
#[derive(Debug)]
pub struct Observation<T, E> {
    name: String,
    experiment: String,
    outcome: Result<T, E>,
    duration: Duration,
    publishable: Option<Value>,
}

impl<T, E> Observation<T, E> {
    /// Execute `body` exactly once and capture its outcome.
    ///
    /// The start and end instants are taken from the monotonic clock, so the
    /// recorded duration is non-negative by construction and is recorded even
    /// when the body fails. The publishable form of the value is computed
    /// here, eagerly, by delegating to the owning experiment's
    /// [`publishable_value`](Experiment::publishable_value) hook.
    pub fn capture<X, F>(name: impl Into<String>, experiment: &X, body: F) -> Self
    where
        X: Experiment<Value = T, Error = E>,
        F: FnOnce() -> Result<T, E>,
    {
        let started = Instant::now();
        let outcome = body();
        let duration = started.elapsed();

        let mut observation = Self {
            name: name.into(),
            experiment: experiment.name().to_string(),
            outcome,
            duration,
            publishable: None,
        };
        observation.publishable = experiment.publishable_value(&observation);
        observation
    }

    /// Name of this observation (`"control"`, `"candidate"`, or a custom label).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the experiment that produced this observation.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Dotted identifier for this observation: `"{experiment}.{name}"`.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}.{}", self.experiment, self.name)
    }

    /// The body's value, if it completed normally.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The captured failure, if the body raised one.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        self.outcome.as_ref().err()
    }

    /// Whether the body failed.
    #[must_use]
    pub fn raised(&self) -> bool {
        self.outcome.is_err()
    }

    /// Wall-clock duration of the body's execution.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Serialization-safe form of the value, as computed at capture time.
    #[must_use]
    pub const fn publishable_value(&self) -> Option<&Value> {
        self.publishable.as_ref()
    }

    /// Whether this is the control observation.
    #[must_use]
    pub fn is_control(&self) -> bool {
        self.name == CONTROL
    }

    /// Whether this is the candidate observation.
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        self.name == CANDIDATE
    }

    /// Consume the observation, yielding the body's outcome.
    ///
    /// Used by `run` to hand the selected observation's value (or re-raise
    /// its error) to the caller without cloning.
    #[allow(clippy::missing_errors_doc)]
    pub fn into_outcome(self) -> Result<T, E> {
        self.outcome
    }
}

impl<T, E: std::error::Error> Observation<T, E> {
    /// Build the serializable record of this observation for publishing.
    #[must_use]
    pub fn to_record(&self) -> ObservationRecord {
        ObservationRecord {
            name: self.name.clone(),
            experiment: self.experiment.clone(),
            slug: self.slug(),
            value: self.publishable.clone(),
            duration: self.duration,
            error_type: self
                .error()
                .map(|_| std::any::type_name::<E>().to_string()),
            error_message: self.error().map(ToString::to_string),
        }
    }
}

/// Serializable snapshot of an [`Observation`] for publish sinks.
///
/// The `value` field holds the publishable form, not the raw value. Error
/// fields are present only when the body raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    name: String,
    experiment: String,
    slug: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    value: Option<Value>,
    duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    error_message: Option<String>,
}

impl ObservationRecord {
    /// Name of the observation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the producing experiment.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Dotted `"{experiment}.{name}"` identifier.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Publishable value, if the body succeeded and produced one.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Wall-clock duration of the body.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Type name of the captured error, if the body raised.
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }

    /// Display message of the captured error, if the body raised.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

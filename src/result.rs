//! Run Result - paired comparison outcome of one experiment run
//!
//! A `RunResult` pairs the completed control and candidate observations of a
//! single run with the experiment's match/ignore verdicts. Both verdicts are
//! computed once, at construction, from the observations already in hand;
//! nothing is ever re-executed afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::experiment::{Experiment, Selection};
use crate::observation::{Observation, ObservationRecord};

/// Immutable pairing of one control and one candidate observation.
#[derive(Debug)]
pub struct RunResult<T, E> {
    experiment: String,
    control: Observation<T, E>,
    candidate: Observation<T, E>,
    matched: bool,
    ignored: bool,
}

impl<T, E> RunResult<T, E> {
    /// Pair two completed observations and compute the verdicts.
    ///
    /// Delegates to [`compare`](Experiment::compare) and
    /// [`ignore`](Experiment::ignore) exactly once each.
    #[must_use]
    pub fn new<X>(experiment: &X, control: Observation<T, E>, candidate: Observation<T, E>) -> Self
    where
        X: Experiment<Value = T, Error = E>,
    {
        let matched = experiment.compare(&control, &candidate);
        let ignored = experiment.ignore(&control, &candidate);
        Self {
            experiment: experiment.name().to_string(),
            control,
            candidate,
            matched,
            ignored,
        }
    }

    /// Name of the experiment that produced this result.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// The control observation.
    #[must_use]
    pub const fn control(&self) -> &Observation<T, E> {
        &self.control
    }

    /// The candidate observation.
    #[must_use]
    pub const fn candidate(&self) -> &Observation<T, E> {
        &self.candidate
    }

    /// Whether control and candidate matched, per the experiment's `compare`.
    #[must_use]
    pub const fn matched(&self) -> bool {
        self.matched
    }

    /// Whether this result is excluded from alerting, per the experiment's `ignore`.
    #[must_use]
    pub const fn ignored(&self) -> bool {
        self.ignored
    }

    /// Whether this result is an actionable mismatch: unmatched and not ignored.
    #[must_use]
    pub const fn mismatched(&self) -> bool {
        !self.matched && !self.ignored
    }

    /// Consume the result, yielding the selected observation.
    #[must_use]
    pub fn into_observation(self, selection: Selection) -> Observation<T, E> {
        match selection {
            Selection::Control => self.control,
            Selection::Candidate => self.candidate,
        }
    }
}

impl<T, E: std::error::Error> RunResult<T, E> {
    /// Build the serializable record of this result for publishing.
    ///
    /// The record carries the experiment name, both observation records, the
    /// verdicts, and a timestamp taken when the record is built.
    #[must_use]
    pub fn to_record(&self) -> ResultRecord {
        ResultRecord {
            experiment: self.experiment.clone(),
            control: self.control.to_record(),
            candidate: self.candidate.to_record(),
            matched: self.matched,
            ignored: self.ignored,
            recorded_at: Utc::now(),
        }
    }
}

/// Serializable snapshot of a [`RunResult`] for publish sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    experiment: String,
    control: ObservationRecord,
    candidate: ObservationRecord,
    matched: bool,
    ignored: bool,
    recorded_at: DateTime<Utc>,
}

impl ResultRecord {
    /// Name of the producing experiment.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Record of the control observation.
    #[must_use]
    pub const fn control(&self) -> &ObservationRecord {
        &self.control
    }

    /// Record of the candidate observation.
    #[must_use]
    pub const fn candidate(&self) -> &ObservationRecord {
        &self.candidate
    }

    /// Match verdict.
    #[must_use]
    pub const fn matched(&self) -> bool {
        self.matched
    }

    /// Ignore verdict.
    #[must_use]
    pub const fn ignored(&self) -> bool {
        self.ignored
    }

    /// When this record was built.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

//! Experiment - behavioral contract and run orchestration
//!
//! An experiment pairs an existing "control" code path with a new "candidate"
//! path. [`Experiment::run`] executes the control every call, executes the
//! candidate only when the experiment is enabled for that call, compares the
//! two captured observations, publishes the paired result, and returns the
//! selected observation's value (control, unless the experiment opts into a
//! rollout via [`select_observation`](Experiment::select_observation)).
//!
//! Jidoka: the candidate can never alter the caller's observed value or
//! control flow unless explicitly selected; its failures are captured, not
//! propagated.

use serde::Serialize;

use crate::context::RunContext;
use crate::error::RunError;
use crate::observation::{Observation, CANDIDATE, CONTROL};
use crate::result::RunResult;

/// Which observation's value a `run` call ultimately returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Return the control observation's value (the default policy).
    #[default]
    Control,
    /// Return the candidate observation's value (controlled rollout).
    Candidate,
}

/// Behavioral contract of one experiment.
///
/// Required methods have no default: an experiment that does not implement
/// `name`, `enabled`, `control`, and `candidate` does not compile (Poka-Yoke,
/// enforced by the trait rather than a runtime "must override" error). The
/// remaining hooks have documented defaults and are overridden selectively.
///
/// An experiment instance is long-lived and carries no per-call state; all
/// per-call data travels in the explicit [`RunContext`] parameter, so one
/// instance can serve concurrent callers.
///
/// # Example
///
/// ```rust
/// use ensayo::{Experiment, RunContext};
///
/// /// Shadow-tests a stricter parser against the legacy one.
/// struct ParserRollout;
///
/// impl Experiment for ParserRollout {
///     type Value = u32;
///     type Error = std::num::ParseIntError;
///
///     fn name(&self) -> &str {
///         "parser-rollout"
///     }
///
///     fn enabled(&self, ctx: &RunContext) -> bool {
///         ctx.get_bool("shadow").unwrap_or(false)
///     }
///
///     fn control(&self, ctx: &RunContext) -> Result<u32, Self::Error> {
///         ctx.get_str("payload").unwrap_or("0").trim().parse()
///     }
///
///     fn candidate(&self, ctx: &RunContext) -> Result<u32, Self::Error> {
///         ctx.get_str("payload").unwrap_or("0").parse()
///     }
/// }
///
/// let ctx = RunContext::new().with("payload", "42").with("shadow", true);
/// assert_eq!(ParserRollout.run(ctx).unwrap(), 42);
/// ```
pub trait Experiment {
    /// Value produced by the control and candidate bodies.
    ///
    /// `PartialEq` backs the default structural comparison; `Serialize` backs
    /// the default publishable form.
    type Value: PartialEq + Serialize;

    /// Error type the bodies can fail with.
    type Error: std::error::Error;

    /// Stable identifier used in published records and observation slugs.
    fn name(&self) -> &str;

    /// Whether the candidate should run for this call.
    ///
    /// Must not have side effects beyond reading the context or external
    /// state. The control runs regardless of the answer.
    fn enabled(&self, ctx: &RunContext) -> bool;

    /// The existing, baseline behavior. Executed on every call.
    ///
    /// # Errors
    ///
    /// A failure here is captured into the control observation; it reaches
    /// the caller only when the control observation is the selected one.
    fn control(&self, ctx: &RunContext) -> Result<Self::Value, Self::Error>;

    /// The new behavior under evaluation. Executed only when enabled.
    ///
    /// # Errors
    ///
    /// A failure here is captured into the candidate observation and never
    /// reaches the caller unless the candidate is explicitly selected.
    fn candidate(&self, ctx: &RunContext) -> Result<Self::Value, Self::Error>;

    /// Decide whether the two observations match.
    ///
    /// Default: both bodies succeeded and their values are structurally
    /// equal; a raised side never matches. Receives the full observations so
    /// overrides can branch on raised-state. Must be pure.
    fn compare(
        &self,
        control: &Observation<Self::Value, Self::Error>,
        candidate: &Observation<Self::Value, Self::Error>,
    ) -> bool {
        match (control.value(), candidate.value()) {
            (Some(control), Some(candidate)) => control == candidate,
            _ => false,
        }
    }

    /// Decide whether this run's comparison should be excluded from alerting.
    ///
    /// Default: never ignore. Must be pure.
    fn ignore(
        &self,
        _control: &Observation<Self::Value, Self::Error>,
        _candidate: &Observation<Self::Value, Self::Error>,
    ) -> bool {
        false
    }

    /// Hook invoked once per observation whose body failed.
    ///
    /// Side effects (logging, metrics) only; the return value is unused and
    /// control flow is unaffected. Default: no-op.
    fn raised(&self, _observation: &Observation<Self::Value, Self::Error>) {}

    /// Transform a captured value into a serialization-safe form.
    ///
    /// Computed once per observation, at capture time. Default: the value
    /// itself, passed through [`serde_json::to_value`]; `None` when the body
    /// raised or the value does not serialize.
    fn publishable_value(
        &self,
        observation: &Observation<Self::Value, Self::Error>,
    ) -> Option<serde_json::Value> {
        observation
            .value()
            .and_then(|value| serde_json::to_value(value).ok())
    }

    /// Side-effecting sink for a completed result.
    ///
    /// Recommended override point for an application-wide base experiment:
    /// serialize [`RunResult::to_record`] into storage, metrics, or logs.
    /// Default: no-op.
    ///
    /// # Errors
    ///
    /// A sink failure propagates to the caller of `run` as
    /// [`RunError::Publish`]; guard the sink internally if publish failures
    /// must never affect callers.
    fn publish(&self, _result: &RunResult<Self::Value, Self::Error>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Choose which observation's value `run` returns.
    ///
    /// Consulted only when the experiment was enabled and both observations
    /// exist. Default: [`Selection::Control`]. Overriding to return
    /// [`Selection::Candidate`] (typically off a context flag) is the
    /// controlled-rollout path.
    fn select_observation(
        &self,
        _result: &RunResult<Self::Value, Self::Error>,
        _ctx: &RunContext,
    ) -> Selection {
        Selection::Control
    }

    /// Run the experiment once with the given context.
    ///
    /// The control body executes on every call, enabled or not. When enabled,
    /// the candidate also executes — in randomized order relative to the
    /// control, to avoid systematic cache/warm-up bias in the captured
    /// timings; the returned value and the published result are unaffected by
    /// the order. The [`raised`](Experiment::raised) hook fires once per
    /// failed observation as soon as it is captured. The paired result is
    /// published before the selected value is returned.
    ///
    /// The context is owned by this call and dropped on return, on every
    /// path; it is never retained by the experiment.
    ///
    /// Not meant to be overridden.
    ///
    /// # Errors
    ///
    /// - [`RunError::Body`] when the selected observation's body failed; the
    ///   captured error is re-raised unchanged.
    /// - [`RunError::Publish`] when the publish sink failed.
    fn run(&self, context: RunContext) -> Result<Self::Value, RunError<Self::Error>>
    where
        Self: Sized,
    {
        // Disabled: run the control alone and return its outcome directly.
        // No candidate observation, no result, no publish.
        if !self.enabled(&context) {
            let control = Observation::capture(CONTROL, self, || self.control(&context));
            if control.raised() {
                self.raised(&control);
            }
            tracing::debug!(
                experiment = self.name(),
                "experiment disabled; candidate skipped"
            );
            return control.into_outcome().map_err(RunError::Body);
        }

        let capture_control = || {
            let observation = Observation::capture(CONTROL, self, || self.control(&context));
            if observation.raised() {
                self.raised(&observation);
            }
            observation
        };
        let capture_candidate = || {
            let observation = Observation::capture(CANDIDATE, self, || self.candidate(&context));
            if observation.raised() {
                self.raised(&observation);
            }
            observation
        };

        let (control, candidate) = if rand::random::<bool>() {
            let control = capture_control();
            (control, capture_candidate())
        } else {
            let candidate = capture_candidate();
            (capture_control(), candidate)
        };

        let result = RunResult::new(self, control, candidate);
        tracing::debug!(
            experiment = self.name(),
            matched = result.matched(),
            ignored = result.ignored(),
            control_duration = ?result.control().duration(),
            candidate_duration = ?result.candidate().duration(),
            "experiment run complete"
        );

        self.publish(&result).map_err(RunError::Publish)?;

        let selection = self.select_observation(&result, &context);
        result
            .into_observation(selection)
            .into_outcome()
            .map_err(RunError::Body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, thiserror::Error)]
    #[error("boom!")]
    struct Boom;

    /// Toggleable experiment that counts body and hook invocations.
    struct Toggle {
        on: bool,
        fail_control: bool,
        control_calls: Cell<u32>,
        candidate_calls: Cell<u32>,
        publish_calls: Cell<u32>,
        published_matched: Cell<Option<bool>>,
    }

    impl Toggle {
        fn new(on: bool) -> Self {
            Self {
                on,
                fail_control: false,
                control_calls: Cell::new(0),
                candidate_calls: Cell::new(0),
                publish_calls: Cell::new(0),
                published_matched: Cell::new(None),
            }
        }

        fn failing_control(on: bool) -> Self {
            Self {
                fail_control: true,
                ..Self::new(on)
            }
        }
    }

    impl Experiment for Toggle {
        type Value = &'static str;
        type Error = Boom;

        fn name(&self) -> &str {
            "toggle"
        }

        fn enabled(&self, _ctx: &RunContext) -> bool {
            self.on
        }

        fn control(&self, _ctx: &RunContext) -> Result<&'static str, Boom> {
            self.control_calls.set(self.control_calls.get() + 1);
            if self.fail_control {
                Err(Boom)
            } else {
                Ok("success")
            }
        }

        fn candidate(&self, _ctx: &RunContext) -> Result<&'static str, Boom> {
            self.candidate_calls.set(self.candidate_calls.get() + 1);
            Ok("success")
        }

        fn publish(&self, result: &RunResult<&'static str, Boom>) -> anyhow::Result<()> {
            self.publish_calls.set(self.publish_calls.get() + 1);
            self.published_matched.set(Some(result.matched()));
            Ok(())
        }
    }

    #[test]
    fn test_disabled_runs_control_only() {
        let experiment = Toggle::new(false);
        let value = experiment.run(RunContext::new()).expect("control value");

        assert_eq!(value, "success");
        assert_eq!(experiment.control_calls.get(), 1);
        assert_eq!(experiment.candidate_calls.get(), 0);
        assert_eq!(experiment.publish_calls.get(), 0);
    }

    #[test]
    fn test_enabled_runs_both_and_publishes_once() {
        let experiment = Toggle::new(true);
        let value = experiment.run(RunContext::new()).expect("control value");

        assert_eq!(value, "success");
        assert_eq!(experiment.control_calls.get(), 1);
        assert_eq!(experiment.candidate_calls.get(), 1);
        assert_eq!(experiment.publish_calls.get(), 1);
        assert_eq!(experiment.published_matched.get(), Some(true));
    }

    #[test]
    fn test_disabled_control_failure_reraised() {
        let experiment = Toggle::failing_control(false);
        let error = experiment.run(RunContext::new()).expect_err("control error");

        assert!(error.is_body());
        assert_eq!(error.to_string(), "boom!");
    }

    #[test]
    fn test_selection_defaults_to_control() {
        assert_eq!(Selection::default(), Selection::Control);
    }
}

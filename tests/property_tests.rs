//! Property-based tests for the experiment harness
//!
//! Invariants under arbitrary control/candidate values:
//! - Non-interference: the candidate never changes what the caller receives
//! - Gating: the candidate executes iff the experiment is enabled
//! - Comparison: pure, idempotent, and structural by default
//! - Run with ProptestConfig::with_cases(100)

use std::sync::atomic::{AtomicU32, Ordering};

use ensayo::{Experiment, Observation, RunContext, RunResult, CANDIDATE, CONTROL};
use proptest::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("injected failure")]
struct Injected;

/// Fixed-value experiment with counters, parameterized per proptest case.
struct Pair {
    control: i64,
    candidate: i64,
    on: bool,
    control_calls: AtomicU32,
    candidate_calls: AtomicU32,
}

fn pair(control: i64, candidate: i64, on: bool) -> Pair {
    Pair {
        control,
        candidate,
        on,
        control_calls: AtomicU32::new(0),
        candidate_calls: AtomicU32::new(0),
    }
}

impl Experiment for Pair {
    type Value = i64;
    type Error = Injected;

    fn name(&self) -> &str {
        "pair"
    }

    fn enabled(&self, _ctx: &RunContext) -> bool {
        self.on
    }

    fn control(&self, _ctx: &RunContext) -> Result<i64, Injected> {
        self.control_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.control)
    }

    fn candidate(&self, _ctx: &RunContext) -> Result<i64, Injected> {
        self.candidate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidate)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the caller always receives the control's value, whatever
    /// the candidate computes and whether or not it runs.
    #[test]
    fn prop_run_returns_control_value(
        control in any::<i64>(),
        candidate in any::<i64>(),
        on in any::<bool>()
    ) {
        let experiment = pair(control, candidate, on);
        let value = experiment.run(RunContext::new()).expect("control value");
        prop_assert_eq!(value, control);
    }

    /// Property: control runs exactly once per call; candidate runs exactly
    /// once when enabled and never when disabled.
    #[test]
    fn prop_candidate_gated_by_enabled(
        control in any::<i64>(),
        candidate in any::<i64>(),
        on in any::<bool>()
    ) {
        let experiment = pair(control, candidate, on);
        experiment.run(RunContext::new()).expect("control value");

        prop_assert_eq!(experiment.control_calls.load(Ordering::SeqCst), 1);
        prop_assert_eq!(
            experiment.candidate_calls.load(Ordering::SeqCst),
            u32::from(on)
        );
    }

    /// Property: the default comparison is structural equality and calling
    /// it twice on the same observations gives the same answer.
    #[test]
    fn prop_compare_is_pure_and_structural(
        control in any::<i64>(),
        candidate in any::<i64>()
    ) {
        let experiment = pair(control, candidate, true);
        let left = Observation::capture(CONTROL, &experiment, || Ok(control));
        let right = Observation::capture(CANDIDATE, &experiment, || Ok(candidate));

        let first = experiment.compare(&left, &right);
        let second = experiment.compare(&left, &right);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, control == candidate);

        prop_assert!(!experiment.ignore(&left, &right));
    }

    /// Property: a raised side never matches under the default comparison,
    /// regardless of the surviving side's value.
    #[test]
    fn prop_raised_side_never_matches(value in any::<i64>(), raised_control in any::<bool>()) {
        let experiment = pair(value, value, true);
        let (control, candidate) = if raised_control {
            (
                Observation::capture(CONTROL, &experiment, || Err(Injected)),
                Observation::capture(CANDIDATE, &experiment, || Ok(value)),
            )
        } else {
            (
                Observation::capture(CONTROL, &experiment, || Ok(value)),
                Observation::capture(CANDIDATE, &experiment, || Err(Injected)),
            )
        };

        let result = RunResult::new(&experiment, control, candidate);
        prop_assert!(!result.matched());
        prop_assert!(result.mismatched());
    }

    /// Property: observation records always carry the slug and the duration,
    /// and carry an error message exactly when the body raised.
    #[test]
    fn prop_record_error_fields_track_outcome(value in any::<i64>(), fail in any::<bool>()) {
        let experiment = pair(value, value, true);
        let observation = Observation::capture(CONTROL, &experiment, || {
            if fail { Err(Injected) } else { Ok(value) }
        });
        let record = observation.to_record();

        prop_assert_eq!(record.slug(), "pair.control");
        prop_assert_eq!(record.error_message().is_some(), fail);
        prop_assert_eq!(record.value().is_some(), !fail);
    }
}

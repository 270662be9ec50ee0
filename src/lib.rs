//! # Ensayo: Shadow-Execution Experiment Harness
//!
//! Ensayo runs an existing ("control") code path and a new ("candidate")
//! code path side by side, captures the outcome of each (value, error,
//! timing), decides whether the two outcomes match, and publishes the
//! comparison for offline analysis — while always returning a value
//! consistent with the control path unless an experiment explicitly opts
//! into substituting the candidate's value.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: candidate failures are captured into observations, never
//!   propagated; callers keep the control path's exact behavior
//! - **Poka-Yoke safety**: required hooks (`name`, `enabled`, `control`,
//!   `candidate`) are trait methods without defaults, so an incomplete
//!   experiment does not compile
//! - **Genchi Genbutsu**: published records carry the real observations —
//!   values, durations, errors — not derived summaries
//!
//! ## Example Usage
//!
//! ```rust
//! use ensayo::{Experiment, RunContext};
//!
//! /// Shadow-tests a checksum rewrite against the legacy implementation.
//! struct ChecksumRollout;
//!
//! impl Experiment for ChecksumRollout {
//!     type Value = u32;
//!     type Error = std::num::ParseIntError;
//!
//!     fn name(&self) -> &str {
//!         "checksum-rollout"
//!     }
//!
//!     fn enabled(&self, ctx: &RunContext) -> bool {
//!         ctx.get_bool("shadow").unwrap_or(false)
//!     }
//!
//!     fn control(&self, ctx: &RunContext) -> Result<u32, Self::Error> {
//!         ctx.get_str("payload").unwrap_or("0").trim().parse()
//!     }
//!
//!     fn candidate(&self, ctx: &RunContext) -> Result<u32, Self::Error> {
//!         ctx.get_str("payload").unwrap_or("0").parse()
//!     }
//! }
//!
//! let ctx = RunContext::new().with("payload", "42").with("shadow", true);
//! let value = ChecksumRollout.run(ctx).expect("control value");
//! assert_eq!(value, 42);
//! ```
//!
//! The harness is synchronous: control and candidate execute sequentially
//! (in randomized order) within one `run` call, with no built-in deadlines.
//! A slow candidate therefore adds to the caller-visible latency of the run;
//! embedders in latency-sensitive paths should account for that.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod context;
pub mod error;
pub mod experiment;
pub mod observation;
pub mod result;

pub use context::RunContext;
pub use error::RunError;
pub use experiment::{Experiment, Selection};
pub use observation::{Observation, ObservationRecord, CANDIDATE, CONTROL};
pub use result::{ResultRecord, RunResult};

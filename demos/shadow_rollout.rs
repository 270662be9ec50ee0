//! Shadow rollout demo: a legacy tax calculator vs a candidate rewrite.
//!
//! The legacy path computes integer tax with truncating division; the
//! rewrite rounds through floating point. The harness surfaces the inputs
//! where the two disagree without ever changing what callers receive.
//!
//! Run with: cargo run --example shadow_rollout
//! Add RUST_LOG=debug for the harness's tracing output.

use std::sync::Mutex;

use ensayo::{Experiment, RunContext, RunResult};

#[derive(Debug, thiserror::Error)]
enum PricingError {
    #[error("unknown region: {0}")]
    UnknownRegion(String),
}

fn tax_rate(region: &str) -> Result<i64, PricingError> {
    match region {
        "us" => Ok(8),
        "eu" => Ok(20),
        other => Err(PricingError::UnknownRegion(other.to_string())),
    }
}

/// Shadow-tests the rounded tax computation against the truncating one.
#[derive(Default)]
struct TaxRollout {
    records: Mutex<Vec<String>>,
}

impl Experiment for TaxRollout {
    type Value = i64;
    type Error = PricingError;

    fn name(&self) -> &str {
        "tax-rollout"
    }

    fn enabled(&self, ctx: &RunContext) -> bool {
        ctx.get_bool("shadow").unwrap_or(false)
    }

    fn control(&self, ctx: &RunContext) -> Result<i64, PricingError> {
        let cents = ctx.get_i64("cents").unwrap_or(0);
        let rate = tax_rate(ctx.get_str("region").unwrap_or(""))?;
        Ok(cents + cents * rate / 100)
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn candidate(&self, ctx: &RunContext) -> Result<i64, PricingError> {
        let cents = ctx.get_i64("cents").unwrap_or(0);
        let rate = tax_rate(ctx.get_str("region").unwrap_or(""))?;
        Ok((cents as f64 * (1.0 + rate as f64 / 100.0)).round() as i64)
    }

    fn publish(&self, result: &RunResult<i64, PricingError>) -> anyhow::Result<()> {
        let record = serde_json::to_string_pretty(&result.to_record())?;
        self.records.lock().expect("records lock").push(record);
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rollout = TaxRollout::default();
    let orders: [(i64, &str, bool); 4] = [
        (1_000, "us", true),
        (2_599, "eu", true),
        (33, "us", true),
        (40, "us", false),
    ];

    for (cents, region, shadow) in orders {
        let ctx = RunContext::new()
            .with("cents", cents)
            .with("region", region)
            .with("shadow", shadow);
        let total = rollout.run(ctx)?;
        println!("{region}: {cents} cents -> {total} cents (shadow={shadow})");
    }

    println!("\npublished records:");
    for record in rollout.records.lock().expect("records lock").iter() {
        println!("{record}");
    }

    Ok(())
}

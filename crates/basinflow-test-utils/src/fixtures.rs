//! Reusable stage test fixtures.
//!
//! - [`ConstStage`] writes a constant value for every deposited layer.
//! - [`FailingStage`] fails deterministically after N calls.

use basinflow_core::{Quantity, QuantitySet, StageError};
use basinflow_stage::{Stage, StepContext, WriteMode};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Writes a constant value to every deposited layer (Full write mode).
///
/// Useful for feeding downstream stages a known input, or for injecting
/// non-finite values to exercise the engine's output scan.
pub struct ConstStage {
    pub name: String,
    pub output: Quantity,
    pub value: f64,
}

impl ConstStage {
    pub fn new(name: impl Into<String>, output: Quantity, value: f64) -> Self {
        Self {
            name: name.into(),
            output,
            value,
        }
    }
}

impl Stage for ConstStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> QuantitySet {
        QuantitySet::empty()
    }

    fn writes(&self) -> Vec<(Quantity, WriteMode)> {
        vec![(self.output, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), StageError> {
        let present = ctx.present();
        let output = ctx
            .writes()
            .write(self.output)
            .ok_or_else(|| StageError::ExecutionFailed {
                reason: format!("{} not writable", self.output),
            })?;
        for &i in present {
            output[i] = self.value;
        }
        Ok(())
    }
}

/// Fails deterministically after a configurable number of successful calls.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Sync`.
pub struct FailingStage {
    pub name: String,
    pub output: Quantity,
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingStage {
    /// Create a stage that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, output: Quantity, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            output,
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `step()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> QuantitySet {
        QuantitySet::empty()
    }

    fn writes(&self) -> Vec<(Quantity, WriteMode)> {
        vec![(self.output, WriteMode::Full)]
    }

    fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), StageError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(StageError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }
}

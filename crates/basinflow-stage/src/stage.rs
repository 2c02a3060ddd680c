//! The [`Stage`] trait and [`WriteMode`] enum.
//!
//! Stages are stateless operators executed in sequence at every simulated
//! age. They declare their quantity dependencies up front so the engine can
//! validate the pipeline before the first step.

use basinflow_core::{Quantity, QuantitySet, StageError};

use crate::context::StepContext;

/// How a written quantity's buffer is initialised before `step()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Zeroed buffer. The stage must fill every present layer's slots.
    Full,
    /// Buffer seeded with the previous step's values. The stage updates
    /// only what changes.
    Incremental,
}

/// A stateless operator in the per-step pipeline.
///
/// # Contract
///
/// - `step()` must be deterministic: same inputs produce identical outputs.
/// - `&self`: stages hold parameters only. State carried between steps
///   (kinetic reactants, for instance) lives in quantities and is read back
///   through `ctx.reads_previous()`.
/// - `reads()`, `writes()` and `components()` are called once when the
///   pipeline is validated, not per step.
///
/// # Examples
///
/// A stage that writes a constant temperature to every deposited layer:
///
/// ```
/// use basinflow_stage::{Stage, StepContext, WriteMode};
/// use basinflow_core::{Quantity, QuantitySet, StageError};
///
/// struct Isothermal(f64);
///
/// impl Stage for Isothermal {
///     fn name(&self) -> &str { "isothermal" }
///
///     fn reads(&self) -> QuantitySet { QuantitySet::empty() }
///
///     fn writes(&self) -> Vec<(Quantity, WriteMode)> {
///         vec![(Quantity::Temperature, WriteMode::Full)]
///     }
///
///     fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), StageError> {
///         let present = ctx.present();
///         let out = ctx.writes().write(Quantity::Temperature).ok_or_else(|| {
///             StageError::ExecutionFailed { reason: "temperature not writable".into() }
///         })?;
///         for &i in present {
///             out[i] = self.0;
///         }
///         Ok(())
///     }
/// }
///
/// assert_eq!(Isothermal(20.0).name(), "isothermal");
/// ```
pub trait Stage: Send + Sync + 'static {
    /// Human-readable name for errors and logs.
    fn name(&self) -> &str;

    /// Quantities read from the current step.
    ///
    /// Each must be written by an earlier stage in the pipeline.
    fn reads(&self) -> QuantitySet;

    /// Quantities read from the previous step.
    ///
    /// Each must be written by some stage in the pipeline. At the first
    /// step these buffers hold zeros.
    fn reads_previous(&self) -> QuantitySet {
        QuantitySet::empty()
    }

    /// Quantities this stage writes, with their initialisation mode.
    fn writes(&self) -> Vec<(Quantity, WriteMode)>;

    /// Values per layer for a written quantity. Default: 1.
    fn components(&self, _quantity: Quantity) -> usize {
        1
    }

    /// Largest step (Myr) this stage tolerates.
    ///
    /// The pipeline validates the schedule's step against the minimum across
    /// stages. Return `None` to impose no constraint.
    fn max_step_myr(&self) -> Option<f64> {
        None
    }

    /// Execute the stage for one simulated age.
    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), StageError>;
}

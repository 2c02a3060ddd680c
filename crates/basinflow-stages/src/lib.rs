//! Reference stages for the BasinFlow simulation engine.
//!
//! Provides the four stages of a petroleum-system run and the kinetic
//! schemes they integrate.
//!
//! # Pipeline order (each step)
//!
//! 1. [`Decompactor`]: writes(burial_top, burial_bottom, porosity)
//! 2. [`ThermalSolver`]: reads(burial_top, burial_bottom) → writes(temperature)
//! 3. [`MaturityKinetics`]: reads(temperature), reads_previous(temperature,
//!    reflectance_reactants) → writes(reflectance_reactants, maturity)
//! 4. [`GenerationEngine`]: reads(temperature), reads_previous(temperature,
//!    kerogen_reactants, transformation) → writes(kerogen_reactants,
//!    transformation, generation, expulsion)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod decompaction;
pub mod generation;
pub mod kinetics;
pub mod maturity;
pub mod thermal;

pub use decompaction::Decompactor;
pub use generation::{GenerationEngine, GenerationEngineBuilder, DEFAULT_EXPULSION_THRESHOLD};
pub use kinetics::{KineticScheme, Reaction, ReflectanceTransform, DEFAULT_GAUSSIAN_BINS};
pub use maturity::{MaturityKinetics, MaturityKineticsBuilder};
pub use thermal::{ThermalSolver, ThermalSolverBuilder};

use basinflow_core::{Quantity, StageError};
use basinflow_stage::{Stage, StepContext};

/// The default four-stage pipeline with default parameters.
///
/// ```
/// let stages = basinflow_stages::standard_pipeline();
/// let names: Vec<&str> = stages.iter().map(|s| s.name()).collect();
/// assert_eq!(
///     names,
///     ["Decompactor", "ThermalSolver", "MaturityKinetics", "GenerationEngine"]
/// );
/// ```
pub fn standard_pipeline() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(Decompactor::new()),
        Box::new(ThermalSolver::default()),
        Box::new(MaturityKinetics::default()),
        Box::new(GenerationEngine::default()),
    ]
}

pub(crate) fn unavailable(quantity: Quantity) -> StageError {
    StageError::ExecutionFailed {
        reason: format!("{quantity} not available to this stage"),
    }
}

pub(crate) fn previous_slice<'a>(
    ctx: &StepContext<'a>,
    quantity: Quantity,
) -> Result<&'a [f64], StageError> {
    ctx.reads_previous()
        .read(quantity)
        .ok_or_else(|| unavailable(quantity))
}

//! BasinFlow: one-dimensional basin and petroleum-system simulation.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! BasinFlow sub-crates. For most users, adding `basinflow` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use basinflow::prelude::*;
//!
//! let model = ModelState::new(
//!     vec![
//!         Layer::new("overburden", 50.0, 0.0, 3000.0, "shale"),
//!         Layer::new("source", 60.0, 50.0, 100.0, "shale")
//!             .with_source_rock(4.0, 450.0, KerogenType::TypeII),
//!     ],
//!     HeatFlowModel::Constant(60.0),
//! );
//! let result = basinflow::simulate(&model).unwrap();
//!
//! let source = result.layer_index("source").unwrap();
//! let ro = result.maturity(source);
//! assert_eq!(ro.last().unwrap().age, 0.0);
//! assert!(ro.windows(2).all(|w| w[1].value >= w[0].value));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `basinflow-core` | Layers, lithologies, heat flow, result tables, errors |
//! | [`stage`] | `basinflow-stage` | Stage trait and pipeline validation |
//! | [`stages`] | `basinflow-stages` | Decompaction, thermal, maturity and generation stages |
//! | [`engine`] | `basinflow-engine` | Time schedule, step loop, background runs |
//! | [`scenario`] | `basinflow-scenario` | Scenario snapshots, persistence and comparison |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`basinflow-core`).
///
/// Contains the stratigraphic input model, heat-flow boundary condition,
/// quantity identifiers, result tables and the shared error types.
pub use basinflow_core as types;

/// Stage trait and pipeline validation (`basinflow-stage`).
///
/// The [`stage::Stage`] trait is the extension point for custom physics.
pub use basinflow_stage as stage;

/// Reference stages (`basinflow-stages`).
///
/// [`stages::Decompactor`], [`stages::ThermalSolver`],
/// [`stages::MaturityKinetics`] and [`stages::GenerationEngine`], assembled
/// in order by [`stages::standard_pipeline`].
pub use basinflow_stages as stages;

/// Simulation orchestration (`basinflow-engine`).
///
/// [`engine::Simulation`] runs a pipeline over a model on the calling
/// thread; [`engine::BackgroundRun`] runs it on a worker thread.
pub use basinflow_engine as engine;

/// Scenario persistence and comparison (`basinflow-scenario`).
pub use basinflow_scenario as scenario;

use basinflow_core::{ModelState, SimulationResult};
use basinflow_engine::{RunError, Simulation, SimulationConfig};

/// Run the standard four-stage pipeline over `model` with the default
/// 1 Myr schedule.
///
/// Builds a fresh [`engine::Simulation`] per call. Hosts running many
/// models should build one and reuse it.
pub fn simulate(model: &ModelState) -> Result<SimulationResult, RunError> {
    let sim = Simulation::new(SimulationConfig::new(basinflow_stages::standard_pipeline()))?;
    sim.run(model, |_| {})
}

/// Common imports for typical BasinFlow usage.
///
/// ```rust
/// use basinflow::prelude::*;
/// ```
pub mod prelude {
    // Input model
    pub use basinflow_core::{
        AgeSeries, CompactionModel, CompactionParams, HeatFlowModel, KerogenType, Layer,
        Lithology, ModelState, SourceRock, SurfaceTemperature, ThermalProps,
    };

    // Results
    pub use basinflow_core::{
        BurialSample, DepthInterval, ExportRow, LayerSummary, SimulationResult, ValueSample,
    };

    // Errors
    pub use basinflow_core::{InputError, StageError, StepError};

    // Stages
    pub use basinflow_stage::{Stage, StepContext, WriteMode};
    pub use basinflow_stages::{
        standard_pipeline, Decompactor, GenerationEngine, MaturityKinetics, ThermalSolver,
    };

    // Engine
    pub use basinflow_engine::{
        BackgroundRun, CancelToken, ConfigError, Progress, RunError, RunEvent, RunSlot,
        Simulation, SimulationConfig, TimeStepPolicy,
    };

    // Scenario
    pub use basinflow_scenario::{Scenario, ScenarioError};
}

//! Core types and traits for the BasinFlow simulation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the stratigraphic input model, the heat-flow boundary condition,
//! per-layer quantity identifiers, the layer-major result tables, and
//! the error types shared by every other crate in the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compaction;
pub mod error;
pub mod id;
pub mod layer;
pub mod lithology;
pub mod model;
pub mod quantity;
pub mod result;
pub mod series;
pub mod table;
pub mod traits;
pub mod units;

pub use compaction::{CompactionModel, CompactionParams, PorosityLaw};
pub use error::{InputError, StageError, StepError};
pub use id::{LayerId, StepIndex};
pub use layer::{KerogenType, Layer, ResolvedLayer, SourceRock, ThermalProps};
pub use lithology::{Lithology, LithologyDefaults};
pub use model::ModelState;
pub use quantity::{Quantity, QuantitySet};
pub use result::{
    BurialSample, DepthInterval, ExportRow, LayerSummary, ResultData, ResultMeta, ShapeError,
    SimulationResult, ValueSample,
};
pub use series::{AgeSeries, ControlPoint, HeatFlowModel, SurfaceTemperature};
pub use table::LayerTable;
pub use traits::{QuantityReader, QuantityWriter};

//! Error types shared across the workspace.
//!
//! Organised by where the failure originates: input validation
//! ([`InputError`]), a single stage's execution ([`StageError`]), and the
//! step loop that wraps stage failures with their age ([`StepError`]).

use std::error::Error;
use std::fmt;

use crate::id::LayerId;
use crate::quantity::Quantity;

/// Fatal problems with a [`ModelState`](crate::ModelState).
///
/// Unrecognised lithologies are not an input error; they fall back to
/// shale's properties with a logged warning.
#[derive(Clone, Debug, PartialEq)]
pub enum InputError {
    /// The stratigraphic column has no layers.
    EmptyStratigraphy,
    /// Two layers share the same id.
    DuplicateLayerId {
        /// The repeated id.
        id: LayerId,
    },
    /// `age_start <= age_end` or `age_end < 0`.
    InvalidAgeRange {
        /// Offending layer.
        layer: LayerId,
        /// Declared start of deposition (Ma).
        age_start: f64,
        /// Declared end of deposition (Ma).
        age_end: f64,
    },
    /// Thickness is negative.
    NegativeThickness {
        /// Offending layer.
        layer: LayerId,
        /// The declared thickness (m).
        thickness: f64,
    },
    /// A numeric field is NaN or infinite.
    NonFiniteValue {
        /// Offending layer.
        layer: LayerId,
        /// Name of the field.
        field: String,
    },
    /// A layer is not younger than the layer beneath it.
    LayersOutOfOrder {
        /// The shallower layer.
        upper: LayerId,
        /// The deeper layer.
        lower: LayerId,
    },
    /// The compaction override is not a physical porosity law.
    InvalidCompaction {
        /// Offending layer.
        layer: LayerId,
        /// What is wrong with it.
        reason: String,
    },
    /// The thermal override is out of range.
    InvalidThermal {
        /// Offending layer.
        layer: LayerId,
        /// What is wrong with it.
        reason: String,
    },
    /// Source-rock richness is out of range.
    InvalidSourceRock {
        /// Offending layer.
        layer: LayerId,
        /// What is wrong with it.
        reason: String,
    },
    /// The heat-flow model is malformed.
    InvalidHeatFlow {
        /// What is wrong with it.
        reason: String,
    },
    /// The surface-temperature series is malformed.
    InvalidSurfaceTemperature {
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStratigraphy => write!(f, "stratigraphy has no layers"),
            Self::DuplicateLayerId { id } => write!(f, "duplicate layer id '{id}'"),
            Self::InvalidAgeRange {
                layer,
                age_start,
                age_end,
            } => write!(
                f,
                "layer '{layer}': invalid age range {age_start} Ma .. {age_end} Ma \
                 (need age_start > age_end >= 0)"
            ),
            Self::NegativeThickness { layer, thickness } => {
                write!(f, "layer '{layer}': negative thickness {thickness} m")
            }
            Self::NonFiniteValue { layer, field } => {
                write!(f, "layer '{layer}': {field} is not finite")
            }
            Self::LayersOutOfOrder { upper, lower } => write!(
                f,
                "layer '{upper}' must be younger than the layer '{lower}' beneath it"
            ),
            Self::InvalidCompaction { layer, reason } => {
                write!(f, "layer '{layer}': invalid compaction: {reason}")
            }
            Self::InvalidThermal { layer, reason } => {
                write!(f, "layer '{layer}': invalid thermal properties: {reason}")
            }
            Self::InvalidSourceRock { layer, reason } => {
                write!(f, "layer '{layer}': invalid source rock: {reason}")
            }
            Self::InvalidHeatFlow { reason } => write!(f, "invalid heat flow: {reason}"),
            Self::InvalidSurfaceTemperature { reason } => {
                write!(f, "invalid surface temperature: {reason}")
            }
        }
    }
}

impl Error for InputError {}

/// Errors from a single stage's execution.
///
/// Returned by `Stage::step()` and wrapped in [`StepError::StageFailed`]
/// by the step loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageError {
    /// The stage could not complete.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A written value is NaN or infinite.
    NonFinite {
        /// The quantity containing the value.
        quantity: Quantity,
        /// Index of the layer holding it, if known.
        layer: Option<usize>,
    },
    /// A physical constraint was violated.
    ConstraintViolation {
        /// Description of the violated constraint.
        constraint: String,
    },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::NonFinite { quantity, layer } => {
                write!(f, "non-finite {quantity}")?;
                if let Some(idx) = layer {
                    write!(f, " in layer {idx}")?;
                }
                Ok(())
            }
            Self::ConstraintViolation { constraint } => {
                write!(f, "constraint violation: {constraint}")
            }
        }
    }
}

impl Error for StageError {}

/// Errors from one step of the simulation loop.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A stage returned an error.
    StageFailed {
        /// Name of the failing stage.
        name: String,
        /// Simulated age of the step (Ma).
        age: f64,
        /// The underlying stage error.
        reason: StageError,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StageFailed { name, age, reason } => {
                write!(f, "stage '{name}' failed at {age} Ma: {reason}")
            }
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StageFailed { reason, .. } => Some(reason),
        }
    }
}

//! The single error type a run can end with.

use std::error::Error;
use std::fmt;

use basinflow_core::{InputError, ShapeError, StepError};

use crate::config::ConfigError;

/// Why a run produced no result.
///
/// Every variant is terminal: the run is all-or-nothing and no partial
/// result is returned.
#[derive(Debug)]
pub enum RunError {
    /// The simulation could not be configured.
    Config(ConfigError),
    /// The model state failed validation.
    Input(InputError),
    /// A stage failed at some step.
    Step(StepError),
    /// Cancellation was requested; the run stopped before `age`.
    Cancelled {
        /// The first age not simulated (Ma).
        age: f64,
    },
    /// Another run already holds the scenario's slot.
    Busy,
    /// The assembled result tables were inconsistent.
    Assembly(ShapeError),
    /// The background worker thread could not be started.
    ThreadSpawnFailed {
        /// OS-level reason.
        reason: String,
    },
    /// The background worker thread panicked.
    WorkerPanicked,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Input(e) => write!(f, "invalid model: {e}"),
            Self::Step(e) => write!(f, "{e}"),
            Self::Cancelled { age } => write!(f, "run cancelled before {age} Ma"),
            Self::Busy => write!(f, "a run is already active for this scenario"),
            Self::Assembly(e) => write!(f, "result assembly: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::WorkerPanicked => write!(f, "simulation worker panicked"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Input(e) => Some(e),
            Self::Step(e) => Some(e),
            Self::Assembly(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InputError> for RunError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<StepError> for RunError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

impl From<ShapeError> for RunError {
    fn from(e: ShapeError) -> Self {
        Self::Assembly(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basinflow_core::StageError;

    #[test]
    fn step_error_keeps_its_message_and_source() {
        let err = RunError::from(StepError::StageFailed {
            name: "ThermalSolver".to_string(),
            age: 12.0,
            reason: StageError::ExecutionFailed {
                reason: "boom".to_string(),
            },
        });
        let msg = err.to_string();
        assert!(msg.contains("ThermalSolver"), "{msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn busy_and_cancelled_have_no_source() {
        assert!(RunError::Busy.source().is_none());
        let msg = RunError::Cancelled { age: 5.0 }.to_string();
        assert!(msg.contains("5 Ma"));
    }
}

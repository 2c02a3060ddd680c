//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] is the builder-input for constructing a
//! [`Simulation`](crate::Simulation). [`validate()`](SimulationConfig::validate)
//! checks structural invariants before any model is seen; the simulation
//! constructor calls `validate_pipeline()` again to keep the plan.

use std::error::Error;
use std::fmt;

use basinflow_stage::{validate_pipeline, PipelineError, Stage};

// ── TimeStepPolicy ─────────────────────────────────────────────────

/// How the orchestrator places simulated ages between the oldest
/// deposition and present day.
///
/// Every layer's `age_start` and present day are always on the schedule,
/// whatever the policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeStepPolicy {
    /// Uniform grid anchored at the oldest deposition age.
    Fixed {
        /// Grid spacing (Myr). Default: 1.
        step_myr: f64,
    },
    /// Steps start short after each deposition event and double up to a
    /// ceiling until the next event.
    Adaptive {
        /// Longest allowed step (Myr).
        max_step_myr: f64,
        /// First step after an event (Myr).
        min_step_myr: f64,
    },
}

impl Default for TimeStepPolicy {
    fn default() -> Self {
        Self::Fixed { step_myr: 1.0 }
    }
}

impl TimeStepPolicy {
    /// Longest step the policy can produce (Myr).
    pub fn max_step(&self) -> f64 {
        match *self {
            Self::Fixed { step_myr } => step_myr,
            Self::Adaptive { max_step_myr, .. } => max_step_myr,
        }
    }

    /// Check the policy's parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidTimeStep {
                    reason: format!("{name} must be finite and positive, got {v}"),
                })
            }
        };
        match *self {
            Self::Fixed { step_myr } => positive("step_myr", step_myr),
            Self::Adaptive {
                max_step_myr,
                min_step_myr,
            } => {
                positive("max_step_myr", max_step_myr)?;
                positive("min_step_myr", min_step_myr)?;
                if min_step_myr > max_step_myr {
                    return Err(ConfigError::InvalidTimeStep {
                        reason: format!(
                            "min_step_myr ({min_step_myr}) exceeds max_step_myr ({max_step_myr})"
                        ),
                    });
                }
                Ok(())
            }
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimulationConfig::validate()`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Stage pipeline validation failed.
    Pipeline(PipelineError),
    /// The time-step policy is malformed.
    InvalidTimeStep {
        /// Which parameter is wrong and how.
        reason: String,
    },
    /// `progress_min_delta` is NaN, non-positive, or above 100.
    InvalidProgressDelta {
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
            Self::InvalidTimeStep { reason } => write!(f, "invalid time step: {reason}"),
            Self::InvalidProgressDelta { value } => {
                write!(f, "progress_min_delta must be in (0, 100], got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Complete configuration for constructing a simulation.
pub struct SimulationConfig {
    /// Stages executed in pipeline order each step.
    pub stages: Vec<Box<dyn Stage>>,
    /// Schedule construction policy.
    pub time_step: TimeStepPolicy,
    /// Smallest progress increment (percent) reported to the callback.
    /// Default: 1.
    pub progress_min_delta: f64,
}

impl SimulationConfig {
    /// Configuration with the given stages and default schedule.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            time_step: TimeStepPolicy::default(),
            progress_min_delta: 1.0,
        }
    }

    /// Replace the time-step policy.
    pub fn with_time_step(mut self, time_step: TimeStepPolicy) -> Self {
        self.time_step = time_step;
        self
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Schedule policy.
        self.time_step.validate()?;
        // 2. Progress granularity.
        let d = self.progress_min_delta;
        if !d.is_finite() || d <= 0.0 || d > 100.0 {
            return Err(ConfigError::InvalidProgressDelta { value: d });
        }
        // 3. Pipeline validation (delegates to basinflow-stage). The plan
        //    is discarded; the simulation constructor rebuilds it.
        let _ = validate_pipeline(&self.stages, self.time_step.max_step())?;
        Ok(())
    }
}

impl fmt::Debug for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("SimulationConfig")
            .field("stages", &names)
            .field("time_step", &self.time_step)
            .field("progress_min_delta", &self.progress_min_delta)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basinflow_core::Quantity;
    use basinflow_test_utils::ConstStage;

    fn valid_config() -> SimulationConfig {
        SimulationConfig::new(vec![Box::new(ConstStage::new(
            "const",
            Quantity::Temperature,
            50.0,
        ))])
    }

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_empty_stages_fails() {
        let mut cfg = valid_config();
        cfg.stages.clear();
        match cfg.validate() {
            Err(ConfigError::Pipeline(PipelineError::EmptyPipeline)) => {}
            other => panic!("expected Pipeline(EmptyPipeline), got {other:?}"),
        }
    }

    #[test]
    fn validate_write_conflict_fails() {
        let mut cfg = valid_config();
        cfg.stages.push(Box::new(ConstStage::new(
            "conflict",
            Quantity::Temperature,
            60.0,
        )));
        match cfg.validate() {
            Err(ConfigError::Pipeline(PipelineError::WriteConflict(_))) => {}
            other => panic!("expected Pipeline(WriteConflict), got {other:?}"),
        }
    }

    #[test]
    fn validate_nan_step_fails() {
        let cfg = valid_config().with_time_step(TimeStepPolicy::Fixed { step_myr: f64::NAN });
        match cfg.validate() {
            Err(ConfigError::InvalidTimeStep { .. }) => {}
            other => panic!("expected InvalidTimeStep, got {other:?}"),
        }
    }

    #[test]
    fn validate_inverted_adaptive_bounds_fails() {
        let cfg = valid_config().with_time_step(TimeStepPolicy::Adaptive {
            max_step_myr: 1.0,
            min_step_myr: 2.0,
        });
        match cfg.validate() {
            Err(ConfigError::InvalidTimeStep { reason }) => {
                assert!(reason.contains("exceeds"));
            }
            other => panic!("expected InvalidTimeStep, got {other:?}"),
        }
    }

    #[test]
    fn validate_progress_delta_bounds() {
        for bad in [0.0, -1.0, 150.0, f64::INFINITY] {
            let mut cfg = valid_config();
            cfg.progress_min_delta = bad;
            match cfg.validate() {
                Err(ConfigError::InvalidProgressDelta { .. }) => {}
                other => panic!("expected InvalidProgressDelta for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn step_exceeding_stage_limit_fails() {
        use basinflow_core::{QuantitySet, StageError};
        use basinflow_stage::{StepContext, WriteMode};

        struct Limited;
        impl Stage for Limited {
            fn name(&self) -> &str {
                "limited"
            }
            fn reads(&self) -> QuantitySet {
                QuantitySet::empty()
            }
            fn writes(&self) -> Vec<(Quantity, WriteMode)> {
                vec![(Quantity::Temperature, WriteMode::Full)]
            }
            fn max_step_myr(&self) -> Option<f64> {
                Some(0.5)
            }
            fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), StageError> {
                Ok(())
            }
        }

        let cfg = SimulationConfig::new(vec![Box::new(Limited)]);
        match cfg.validate() {
            Err(ConfigError::Pipeline(PipelineError::StepTooLarge {
                constraining_stage, ..
            })) => assert_eq!(constraining_stage, "limited"),
            other => panic!("expected Pipeline(StepTooLarge), got {other:?}"),
        }
        let cfg = SimulationConfig::new(vec![Box::new(Limited)])
            .with_time_step(TimeStepPolicy::Adaptive {
                max_step_myr: 0.5,
                min_step_myr: 0.1,
            });
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn debug_lists_stage_names() {
        let s = format!("{:?}", valid_config());
        assert!(s.contains("const"));
    }
}

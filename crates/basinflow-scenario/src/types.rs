//! The scenario: a named model with its most recent result.

use std::sync::Arc;

use basinflow_core::{ModelState, SimulationResult};

/// A named model and, once simulated, its result.
///
/// The result is immutable and shared by [`Arc`], so snapshots are cheap
/// even for long histories.
///
/// # Examples
///
/// ```
/// use basinflow_core::{HeatFlowModel, Layer, ModelState};
/// use basinflow_scenario::Scenario;
///
/// let model = ModelState::new(
///     vec![Layer::new("shale", 10.0, 0.0, 500.0, "shale")],
///     HeatFlowModel::Constant(60.0),
/// );
/// let scenario = Scenario::new("north flank", model);
/// let copy = scenario.snapshot();
///
/// assert_eq!(copy.name, "north flank");
/// assert!(copy.result().is_none());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    /// Display name.
    pub name: String,
    /// The input column.
    pub model: ModelState,
    /// Result of the last completed run, if any.
    pub result: Option<Arc<SimulationResult>>,
}

impl Scenario {
    /// A scenario that has not been simulated yet.
    pub fn new(name: impl Into<String>, model: ModelState) -> Self {
        Self {
            name: name.into(),
            model,
            result: None,
        }
    }

    /// Attach a result.
    pub fn with_result(mut self, result: SimulationResult) -> Self {
        self.result = Some(Arc::new(result));
        self
    }

    /// Replace the result after a new run.
    pub fn set_result(&mut self, result: SimulationResult) {
        self.result = Some(Arc::new(result));
    }

    /// Drop the result, e.g. after editing the model.
    pub fn clear_result(&mut self) {
        self.result = None;
    }

    /// The current result.
    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_deref()
    }

    /// Independent copy of the scenario.
    ///
    /// The model is deep-copied so it can be edited freely; the result is
    /// shared with the original.
    pub fn snapshot(&self) -> Self {
        Self {
            name: self.name.clone(),
            model: self.model.clone(),
            result: self.result.as_ref().map(Arc::clone),
        }
    }
}

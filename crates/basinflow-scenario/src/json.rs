//! JSON export and import via `serde_json`.
//!
//! Models use the same camelCase shape a host submits. A scenario document
//! is `{ "name", "model", "result"? }`.

use basinflow_core::{ModelState, SimulationResult};
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::types::Scenario;

#[derive(Serialize)]
struct ScenarioDocRef<'a> {
    name: &'a str,
    model: &'a ModelState,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a SimulationResult>,
}

#[derive(Deserialize)]
struct ScenarioDoc {
    name: String,
    model: ModelState,
    #[serde(default)]
    result: Option<SimulationResult>,
}

/// Serialise a scenario as pretty-printed JSON.
pub fn scenario_to_json(scenario: &Scenario) -> Result<String, ScenarioError> {
    let doc = ScenarioDocRef {
        name: &scenario.name,
        model: &scenario.model,
        result: scenario.result(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a scenario document. A result is shape-checked on the way in.
pub fn scenario_from_json(json: &str) -> Result<Scenario, ScenarioError> {
    let doc: ScenarioDoc = serde_json::from_str(json)?;
    let mut scenario = Scenario::new(doc.name, doc.model);
    if let Some(result) = doc.result {
        scenario.set_result(result);
    }
    Ok(scenario)
}

/// Parse a host-submitted model.
pub fn model_from_json(json: &str) -> Result<ModelState, ScenarioError> {
    Ok(serde_json::from_str(json)?)
}

/// Serialise a result on its own.
pub fn result_to_json(result: &SimulationResult) -> Result<String, ScenarioError> {
    Ok(serde_json::to_string(result)?)
}

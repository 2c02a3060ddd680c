//! The immutable input bundle for one simulation run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::layer::{Layer, ResolvedLayer};
use crate::series::HeatFlowModel;

/// Stratigraphic column plus heat-flow history.
///
/// Layers are ordered top (youngest) to bottom (oldest).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelState {
    /// Layers, top to bottom.
    pub stratigraphy: Vec<Layer>,
    /// Basal heat flow.
    pub heat_flow: HeatFlowModel,
}

impl ModelState {
    /// Bundle a column with its heat-flow history.
    pub fn new(stratigraphy: Vec<Layer>, heat_flow: HeatFlowModel) -> Self {
        Self {
            stratigraphy,
            heat_flow,
        }
    }

    /// Validate the whole model.
    ///
    /// Checks, in order:
    /// 1. The column is non-empty.
    /// 2. Every layer is valid on its own.
    /// 3. Layer ids are unique.
    /// 4. `age_start` strictly increases downward, so deeper layers are
    ///    deposited first.
    /// 5. The heat-flow model is well formed.
    pub fn validate(&self) -> Result<(), InputError> {
        // 1. Non-empty.
        if self.stratigraphy.is_empty() {
            return Err(InputError::EmptyStratigraphy);
        }
        // 2. Per-layer.
        for layer in &self.stratigraphy {
            layer.validate()?;
        }
        // 3. Unique ids.
        let mut seen = HashSet::with_capacity(self.stratigraphy.len());
        for layer in &self.stratigraphy {
            if !seen.insert(&layer.id) {
                return Err(InputError::DuplicateLayerId {
                    id: layer.id.clone(),
                });
            }
        }
        // 4. Order.
        for pair in self.stratigraphy.windows(2) {
            if pair[0].age_start >= pair[1].age_start {
                return Err(InputError::LayersOutOfOrder {
                    upper: pair[0].id.clone(),
                    lower: pair[1].id.clone(),
                });
            }
        }
        // 5. Heat flow.
        self.heat_flow
            .validate()
            .map_err(|reason| InputError::InvalidHeatFlow { reason })?;
        Ok(())
    }

    /// Validate, then resolve every layer's defaults.
    pub fn resolve_layers(&self) -> Result<Vec<ResolvedLayer>, InputError> {
        self.validate()?;
        Ok(self
            .stratigraphy
            .iter()
            .enumerate()
            .map(|(i, layer)| layer.resolve(i))
            .collect())
    }

    /// Age at which the oldest layer starts depositing (Ma).
    pub fn oldest_age(&self) -> Option<f64> {
        self.stratigraphy.last().map(|l| l.age_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> ModelState {
        ModelState::new(
            vec![
                Layer::new("top", 20.0, 0.0, 500.0, "sandstone"),
                Layer::new("mid", 50.0, 20.0, 800.0, "shale"),
                Layer::new("base", 80.0, 50.0, 300.0, "limestone"),
            ],
            HeatFlowModel::Constant(60.0),
        )
    }

    #[test]
    fn valid_column_passes() {
        assert!(column().validate().is_ok());
        assert_eq!(column().oldest_age(), Some(80.0));
    }

    #[test]
    fn empty_column_fails() {
        let model = ModelState::new(Vec::new(), HeatFlowModel::Constant(60.0));
        match model.validate() {
            Err(InputError::EmptyStratigraphy) => {}
            other => panic!("expected EmptyStratigraphy, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_fail() {
        let mut model = column();
        model.stratigraphy[2].id = "top".into();
        match model.validate() {
            Err(InputError::DuplicateLayerId { id }) => assert_eq!(id.as_str(), "top"),
            other => panic!("expected DuplicateLayerId, got {other:?}"),
        }
    }

    #[test]
    fn out_of_order_fails() {
        let mut model = column();
        model.stratigraphy.swap(0, 1);
        match model.validate() {
            Err(InputError::LayersOutOfOrder { upper, lower }) => {
                assert_eq!(upper.as_str(), "mid");
                assert_eq!(lower.as_str(), "top");
            }
            other => panic!("expected LayersOutOfOrder, got {other:?}"),
        }
    }

    #[test]
    fn bad_heat_flow_fails() {
        let mut model = column();
        model.heat_flow = HeatFlowModel::Constant(f64::NAN);
        match model.validate() {
            Err(InputError::InvalidHeatFlow { .. }) => {}
            other => panic!("expected InvalidHeatFlow, got {other:?}"),
        }
    }

    #[test]
    fn resolve_keeps_order() {
        let resolved = column().resolve_layers().unwrap();
        let ids: Vec<_> = resolved.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["top", "mid", "base"]);
        assert!(resolved.iter().enumerate().all(|(i, l)| l.index == i));
    }

    #[test]
    fn json_round_trip() {
        let model = column();
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("heatFlow"));
        let back: ModelState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}

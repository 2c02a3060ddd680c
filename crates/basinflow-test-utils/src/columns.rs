//! Reference stratigraphic columns.

use basinflow_core::{HeatFlowModel, KerogenType, Layer, ModelState, ThermalProps};

/// Index of the source layer in [`buried_source_rock_column`].
pub const SOURCE_LAYER_INDEX: usize = 3;

/// One 2000 m shale deposited at 100 Ma under a constant 60 mW/m².
///
/// With `radiogenic = false` the layer produces no heat, so its midpoint
/// sits at `Ts + 1000 m · q / k` exactly.
pub fn single_shale_layer(radiogenic: bool) -> ModelState {
    let mut layer = Layer::new("shale", 100.0, 0.0, 2000.0, "shale");
    if !radiogenic {
        layer = layer.with_thermal(ThermalProps {
            conductivity: 1.8,
            radiogenic_heat: 0.0,
            heat_capacity: 900.0,
        });
    }
    ModelState::new(vec![layer], HeatFlowModel::Constant(60.0))
}

/// A 100 m Type II source rock (TOC 3 %, HI 500) buried under 6 km of
/// shale deposited in three 30 Myr pulses, heated by 65 mW/m².
///
/// The source passes 120 °C well before present day.
pub fn buried_source_rock_column() -> ModelState {
    ModelState::new(
        vec![
            Layer::new("overburden-3", 30.0, 0.0, 2000.0, "shale"),
            Layer::new("overburden-2", 60.0, 30.0, 2000.0, "shale"),
            Layer::new("overburden-1", 90.0, 60.0, 2000.0, "shale"),
            Layer::new("source", 100.0, 90.0, 100.0, "shale").with_source_rock(
                3.0,
                500.0,
                KerogenType::TypeII,
            ),
        ],
        HeatFlowModel::Constant(65.0),
    )
}

/// A mixed column with every catalog lithology, a zero-thickness marker,
/// an unrecognised lithology and a heat-flow series.
pub fn layered_column() -> ModelState {
    ModelState::new(
        vec![
            Layer::new("sand", 12.0, 0.0, 800.0, "sandstone"),
            Layer::new("marker", 20.0, 12.0, 0.0, "shale"),
            Layer::new("carbonate", 35.0, 20.0, 600.0, "limestone"),
            Layer::new("evaporite", 50.0, 35.0, 300.0, "salt"),
            Layer::new("dolomite", 65.0, 50.0, 400.0, "dolomite"),
            Layer::new("coal", 80.0, 65.0, 50.0, "coal").with_source_rock(
                40.0,
                250.0,
                KerogenType::TypeIII,
            ),
            Layer::new("lake", 110.0, 80.0, 700.0, "shale").with_source_rock(
                6.0,
                750.0,
                KerogenType::TypeI,
            ),
        ],
        HeatFlowModel::Series(
            basinflow_core::AgeSeries::from_pairs(&[(100.0, 80.0), (40.0, 60.0), (0.0, 55.0)])
                .unwrap_or_else(|e| panic!("fixture heat flow: {e}")),
        ),
    )
}

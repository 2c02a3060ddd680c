//! Benchmark profiles for the BasinFlow simulation engine.
//!
//! Provides pre-built columns and simulations for benchmarking:
//!
//! - [`reference_column`]: 12 layers over 240 Myr with a Type II source rock
//! - [`stress_column`]: 120 layers over 600 Myr, every fifth a source rock
//! - [`reference_simulation`]: the standard pipeline on a fixed schedule

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use basinflow_core::{AgeSeries, HeatFlowModel, KerogenType, Layer, ModelState};
use basinflow_engine::{ConfigError, Simulation, SimulationConfig, TimeStepPolicy};
use basinflow_stages::standard_pipeline;

const LITHOLOGIES: [&str; 5] = ["shale", "sandstone", "limestone", "dolomite", "shale"];
const KEROGENS: [KerogenType; 3] = [KerogenType::TypeI, KerogenType::TypeII, KerogenType::TypeIII];

/// Build a column of `layers` contiguous layers, each `span_myr` long.
///
/// Layer `i` (0 = youngest) cycles through the catalog lithologies.
/// Every `source_every`-th layer carries a source rock, cycling kerogen
/// types. Heat flow decays linearly from 80 to 60 mW/m².
pub fn column(layers: usize, span_myr: f64, source_every: usize) -> ModelState {
    let stratigraphy = (0..layers)
        .map(|i| {
            let age_end = span_myr * i as f64;
            let thickness = 200.0 + 50.0 * (i % 7) as f64;
            let layer = Layer::new(
                format!("layer-{i:03}"),
                age_end + span_myr,
                age_end,
                thickness,
                LITHOLOGIES[i % LITHOLOGIES.len()],
            );
            if source_every > 0 && i % source_every == source_every - 1 {
                layer.with_source_rock(3.0, 450.0, KEROGENS[(i / source_every) % KEROGENS.len()])
            } else {
                layer
            }
        })
        .collect();
    let oldest = span_myr * layers as f64;
    let heat_flow = match AgeSeries::from_pairs(&[(oldest, 80.0), (0.0, 60.0)]) {
        Ok(series) => HeatFlowModel::Series(series),
        Err(_) => HeatFlowModel::Constant(60.0),
    };
    ModelState::new(stratigraphy, heat_flow)
}

/// 12 layers of 20 Myr; the oldest is a Type II source rock.
pub fn reference_column() -> ModelState {
    let mut model = column(12, 20.0, 0);
    if let Some(oldest) = model.stratigraphy.pop() {
        model
            .stratigraphy
            .push(oldest.with_source_rock(4.0, 500.0, KerogenType::TypeII));
    }
    model
}

/// 120 layers of 5 Myr, every fifth a source rock.
pub fn stress_column() -> ModelState {
    column(120, 5.0, 5)
}

/// The standard pipeline on a fixed `step_myr` schedule.
pub fn reference_simulation(step_myr: f64) -> Result<Simulation, ConfigError> {
    Simulation::new(
        SimulationConfig::new(standard_pipeline())
            .with_time_step(TimeStepPolicy::Fixed { step_myr }),
    )
}

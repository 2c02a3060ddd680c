//! BasinFlow burial history: a four-layer column from deposition to today.
//!
//! Demonstrates:
//!   1. Building a stratigraphic column with a Type II source rock
//!   2. Describing a heat-flow history as an age series
//!   3. Running the standard pipeline with progress reporting
//!   4. Reading per-layer histories and walking the export rows
//!   5. Saving the scenario and loading it back
//!
//! Run with:
//!   cargo run -p basinflow --example burial_history

use basinflow::prelude::*;
use basinflow::scenario::{load, result_hash, save};

// ─── Column ─────────────────────────────────────────────────────

fn column() -> Result<ModelState, Box<dyn std::error::Error>> {
    // Rift-phase heat flow decaying to a steady 60 mW/m².
    let heat_flow = AgeSeries::from_pairs(&[(120.0, 90.0), (80.0, 70.0), (0.0, 60.0)])?;
    Ok(ModelState::new(
        vec![
            Layer::new("quaternary-sand", 10.0, 0.0, 400.0, "sandstone"),
            Layer::new("chalk", 60.0, 10.0, 1500.0, "limestone"),
            Layer::new("upper-shale", 100.0, 60.0, 2200.0, "shale"),
            Layer::new("kimmeridge", 120.0, 100.0, 150.0, "shale").with_source_rock(
                5.0,
                550.0,
                KerogenType::TypeII,
            ),
        ],
        HeatFlowModel::Series(heat_flow),
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== BasinFlow burial history ===\n");

    let model = column()?;
    let sim = Simulation::new(
        SimulationConfig::new(standard_pipeline())
            .with_time_step(TimeStepPolicy::Fixed { step_myr: 0.5 }),
    )?;
    println!("Stages: {}", sim.stage_names().join(" -> "));
    println!("Schedule: {} steps\n", sim.schedule(&model)?.len());

    let result = sim.run(&model, |p| {
        if p.completed_steps % 40 == 0 || p.is_complete() {
            println!("  {:5.1}%  age {:6.1} Ma", p.percent, p.age);
        }
    })?;

    // ─── Source-rock history ────────────────────────────────────

    let source = result
        .layer_index("kimmeridge")
        .ok_or("source layer missing from result")?;
    let ro = result.maturity(source);
    let tr = result.transformation(source);
    let generation = result.generation(source);
    let peak = generation
        .iter()
        .max_by(|a, b| a.value.total_cmp(&b.value))
        .ok_or("empty generation history")?;

    println!("\nSource rock at present day:");
    if let (Some(ro), Some(tr)) = (ro.last(), tr.last()) {
        println!("  %Ro = {:.2}", ro.value);
        println!("  TR  = {:.3}", tr.value);
    }
    println!(
        "  peak generation {:.2} mg HC/g TOC/Myr at {:.1} Ma",
        peak.value, peak.age
    );

    // ─── Present-day column ─────────────────────────────────────

    println!("\n{:<16} {:>8} {:>8} {:>8} {:>6}", "layer", "top", "base", "T (C)", "%Ro");
    for row in result.rows().filter(|r| r.age == 0.0) {
        if let (Some(burial), Some(t), Some(ro)) = (row.burial, row.temperature, row.maturity) {
            println!(
                "{:<16} {:>8.0} {:>8.0} {:>8.1} {:>6.2}",
                row.layer.id.as_str(),
                burial.top,
                burial.bottom,
                t,
                ro
            );
        }
    }

    // ─── Persist ────────────────────────────────────────────────

    let scenario = Scenario::new("burial history", model).with_result(result);
    let mut bytes = Vec::new();
    save(&scenario, &mut bytes)?;
    let loaded = load(bytes.as_slice())?;
    let hash = loaded.result().map(result_hash).unwrap_or_default();
    println!("\nSaved {} bytes, reloaded result hash {hash:016x}", bytes.len());

    Ok(())
}

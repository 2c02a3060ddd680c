//! Integration tests for the standard stage pipeline.
//!
//! These tests run the four stages together through the orchestrator and
//! check the physical history they produce, not just individual stages in
//! isolation.

use basinflow_core::{HeatFlowModel, KerogenType, Layer, ModelState, SimulationResult};
use basinflow_engine::{Simulation, SimulationConfig, TimeStepPolicy};
use basinflow_stages::{standard_pipeline, DEFAULT_EXPULSION_THRESHOLD};
use basinflow_test_utils::{
    buried_source_rock_column, layered_column, single_shale_layer, SOURCE_LAYER_INDEX,
};
use proptest::prelude::*;

fn run(model: &ModelState) -> SimulationResult {
    run_with(model, TimeStepPolicy::default())
}

fn run_with(model: &ModelState, policy: TimeStepPolicy) -> SimulationResult {
    Simulation::new(SimulationConfig::new(standard_pipeline()).with_time_step(policy))
        .unwrap()
        .run(model, |_| {})
        .unwrap()
}

// ── Single layer ────────────────────────────────────────────────────

#[test]
fn lone_shale_holds_a_linear_gradient() {
    let result = run(&single_shale_layer(false));
    let expected = 20.0 + 1000.0 * 0.060 / 1.8;
    for sample in result.temperature(0) {
        assert!(
            (sample.value - expected).abs() < 1e-3,
            "{} °C at {} Ma",
            sample.value,
            sample.age
        );
    }
    for sample in result.burial(0) {
        assert!((sample.bottom - sample.top - 2000.0).abs() < 1e-6);
    }
}

#[test]
fn lone_shale_matures_slowly() {
    let result = run(&single_shale_layer(false));
    let ro = result.maturity(0);
    assert_eq!(ro.len(), result.time_steps().len());
    assert!(ro.windows(2).all(|w| w[1].value >= w[0].value));
    let last = ro.last().map(|s| s.value).unwrap();
    assert!((0.3..0.6).contains(&last), "final Ro {last}");
}

#[test]
fn radiogenic_heat_raises_the_midpoint() {
    let cold = run(&single_shale_layer(false));
    let warm = run(&single_shale_layer(true));
    let t = |r: &SimulationResult| r.temperature(0).last().map(|s| s.value).unwrap();
    assert!(t(&warm) > t(&cold));
}

// ── Buried source rock ──────────────────────────────────────────────

#[test]
fn buried_source_is_fully_transformed() {
    let result = run(&buried_source_rock_column());
    let tr = result.transformation(SOURCE_LAYER_INDEX);
    let ro = result.maturity(SOURCE_LAYER_INDEX);

    assert!(tr.windows(2).all(|w| w[1].value >= w[0].value));
    assert!(tr.last().unwrap().value > 0.95);
    assert!(ro.last().unwrap().value > 1.3);
    assert_eq!(tr.first().unwrap().value, 0.0);
}

#[test]
fn generation_peaks_inside_the_run() {
    let result = run(&buried_source_rock_column());
    let generation = result.generation(SOURCE_LAYER_INDEX);
    let (peak, _) = generation
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.value.total_cmp(&b.1.value))
        .unwrap();
    assert!(generation[peak].value > 0.0);
    assert!(peak > 0 && peak < generation.len() - 1, "peak at step {peak}");
}

#[test]
fn generated_mass_matches_potential() {
    let model = buried_source_rock_column();
    let potential = model.resolve_layers().unwrap()[SOURCE_LAYER_INDEX].generative_potential();
    let result = run(&model);
    let ages = result.time_steps();
    let generation = result.generation(SOURCE_LAYER_INDEX);
    let generated: f64 = (1..ages.len())
        .map(|i| generation[i].value * (ages[i - 1] - ages[i]))
        .sum();
    let tr = result.transformation(SOURCE_LAYER_INDEX).last().unwrap().value;
    assert!((generated - potential * tr).abs() <= 1e-6 * potential);

    let expelled = result.expulsion(SOURCE_LAYER_INDEX).last().unwrap().value;
    let expected = potential * (tr - DEFAULT_EXPULSION_THRESHOLD);
    assert!((expelled - expected).abs() <= 1e-9 * potential);
}

#[test]
fn non_source_layers_generate_nothing() {
    let result = run(&buried_source_rock_column());
    for layer in 0..SOURCE_LAYER_INDEX {
        assert!(!result.meta().layers[layer].is_source());
        for series in [
            result.transformation(layer),
            result.generation(layer),
            result.expulsion(layer),
        ] {
            assert!(series.iter().all(|s| s.value == 0.0));
        }
    }
}

// ── Column geometry ─────────────────────────────────────────────────

#[test]
fn layers_enter_with_nominal_thickness() {
    let model = layered_column();
    let result = run(&model);
    for (i, layer) in model.stratigraphy.iter().enumerate() {
        let first = result.burial(i)[0];
        assert_eq!(first.age, layer.age_start);
        assert_eq!(first.top, 0.0);
        assert!((first.bottom - layer.thickness).abs() < 1e-6);
    }
}

#[test]
fn column_has_no_gaps() {
    let result = run(&layered_column());
    let data = result.data();
    for step in 0..result.time_steps().len() {
        let stack: Vec<_> = (0..result.layer_count())
            .filter_map(|l| *data.burial.get(l, step).unwrap())
            .collect();
        assert_eq!(stack[0].top, 0.0);
        for pair in stack.windows(2) {
            assert!((pair[0].bottom - pair[1].top).abs() < 1e-9);
            assert!(pair[1].bottom >= pair[1].top);
        }
    }
}

#[test]
fn marker_layer_has_zero_thickness() {
    let result = run(&layered_column());
    let marker = result.layer_index("marker").unwrap();
    assert!(result
        .burial(marker)
        .iter()
        .all(|s| (s.bottom - s.top).abs() < 1e-9));
    assert!(result.temperature(marker).iter().all(|s| s.value.is_finite()));
}

#[test]
fn coarser_adaptive_schedule_agrees_on_present_day() {
    let model = buried_source_rock_column();
    let fine = run_with(&model, TimeStepPolicy::Fixed { step_myr: 0.5 });
    let adaptive = run_with(
        &model,
        TimeStepPolicy::Adaptive {
            max_step_myr: 2.0,
            min_step_myr: 0.25,
        },
    );
    let last = |r: &SimulationResult| r.temperature(SOURCE_LAYER_INDEX).last().unwrap().value;
    // Temperature depends on geometry only, so it is schedule independent.
    assert!((last(&fine) - last(&adaptive)).abs() < 1e-6);
}

// ── Random columns ──────────────────────────────────────────────────

fn arb_column() -> impl Strategy<Value = ModelState> {
    (
        prop::collection::vec((1.0f64..20.0, 10.0f64..1500.0, 0usize..3, any::<bool>()), 1..5),
        40.0f64..90.0,
    )
        .prop_map(|(specs, heat_flow)| {
            let mut age = 0.0;
            let mut layers = Vec::new();
            for (i, (duration, thickness, lith, source)) in specs.into_iter().enumerate() {
                let age_end = age;
                age += duration;
                let lithology = ["shale", "sandstone", "limestone"][lith];
                let mut layer = Layer::new(format!("l{i}"), age, age_end, thickness, lithology);
                if source {
                    layer = layer.with_source_rock(4.0, 400.0, KerogenType::TypeII);
                }
                layers.push(layer);
            }
            ModelState::new(layers, HeatFlowModel::Constant(heat_flow))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn histories_are_physical(model in arb_column()) {
        let result = run(&model);
        for layer in 0..result.layer_count() {
            let ro = result.maturity(layer);
            prop_assert!(ro.windows(2).all(|w| w[1].value >= w[0].value));
            let tr = result.transformation(layer);
            prop_assert!(tr.iter().all(|s| (0.0..=1.0).contains(&s.value)));
            prop_assert!(tr.windows(2).all(|w| w[1].value >= w[0].value));
            prop_assert!(result.porosity(layer).iter().all(|s| (0.0..1.0).contains(&s.value)));
            prop_assert!(result.generation(layer).iter().all(|s| s.value >= 0.0));
        }
    }
}

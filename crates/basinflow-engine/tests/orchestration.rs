//! Integration tests: the standard stage pipeline under the orchestrator.

use std::sync::Arc;

use basinflow_core::{HeatFlowModel, Layer, ModelState};
use basinflow_engine::{
    BackgroundRun, CancelToken, RunError, RunEvent, RunSlot, Simulation, SimulationConfig,
    TimeStepPolicy,
};
use basinflow_stages::standard_pipeline;
use basinflow_test_utils::{buried_source_rock_column, layered_column, single_shale_layer};

fn standard(policy: TimeStepPolicy) -> Simulation {
    Simulation::new(SimulationConfig::new(standard_pipeline()).with_time_step(policy)).unwrap()
}

#[test]
fn every_deposition_age_is_simulated() {
    let model = layered_column();
    for policy in [
        TimeStepPolicy::Fixed { step_myr: 7.0 },
        TimeStepPolicy::Adaptive {
            max_step_myr: 5.0,
            min_step_myr: 0.25,
        },
    ] {
        let result = standard(policy).run(&model, |_| {}).unwrap();
        let ages = result.time_steps();
        for layer in &model.stratigraphy {
            assert!(
                ages.contains(&layer.age_start),
                "{policy:?} skipped {}",
                layer.age_start
            );
        }
        assert_eq!(ages.last().copied(), Some(0.0));
        assert!(ages.windows(2).all(|w| w[0] > w[1]));
    }
}

#[test]
fn near_present_deposition_still_ends_at_present_day() {
    let model = ModelState::new(
        vec![
            Layer::new("thin", 5e-10, 0.0, 10.0, "shale"),
            Layer::new("base", 3.0, 5e-10, 500.0, "shale"),
        ],
        HeatFlowModel::Constant(60.0),
    );
    let result = standard(TimeStepPolicy::default()).run(&model, |_| {}).unwrap();
    let ages = result.time_steps();
    assert_eq!(ages.last().copied(), Some(0.0));
    assert_eq!(result.burial(0).first().map(|s| s.age), Some(5e-10));
}

#[test]
fn near_coincident_layers_are_anchored_at_their_own_age() {
    let model = ModelState::new(
        vec![
            Layer::new("a", 10.0, 0.0, 300.0, "shale"),
            Layer::new("b", 10.0 + 5e-10, 10.0, 300.0, "sandstone"),
        ],
        HeatFlowModel::Constant(60.0),
    );
    let result = standard(TimeStepPolicy::default()).run(&model, |_| {}).unwrap();
    let first = result.burial(0)[0];
    assert_eq!(first.age, 10.0);
    assert_eq!(first.top, 0.0);
    assert!((first.bottom - 300.0).abs() < 1e-6);
    assert_eq!(result.burial(1)[0].age, 10.0 + 5e-10);
}

#[test]
fn runs_are_deterministic() {
    let sim = standard(TimeStepPolicy::default());
    let a = sim.run(&layered_column(), |_| {}).unwrap();
    let b = sim.run(&layered_column(), |_| {}).unwrap();
    assert_eq!(a, b);
}

#[test]
fn schedule_matches_result_axis() {
    let sim = standard(TimeStepPolicy::Fixed { step_myr: 2.0 });
    let model = buried_source_rock_column();
    let schedule = sim.schedule(&model).unwrap();
    let result = sim.run(&model, |_| {}).unwrap();
    assert_eq!(schedule.ages(), result.time_steps());
}

#[test]
fn metrics_name_the_standard_stages() {
    let sim = standard(TimeStepPolicy::default());
    let out = sim
        .execute(&single_shale_layer(true), &CancelToken::new(), &mut |_| {})
        .unwrap();
    for name in [
        "Decompactor",
        "ThermalSolver",
        "MaturityKinetics",
        "GenerationEngine",
    ] {
        assert!(out.metrics.stage(name).is_some(), "missing {name}");
    }
    assert_eq!(out.metrics.steps, 101);
}

#[test]
fn too_coarse_schedule_for_limited_stage_is_rejected() {
    use basinflow_stages::MaturityKinetics;

    let maturity = MaturityKinetics::builder().max_step_myr(0.5).build().unwrap();
    let mut stages = standard_pipeline();
    stages[2] = Box::new(maturity);
    match Simulation::new(SimulationConfig::new(stages)) {
        Err(basinflow_engine::ConfigError::Pipeline(_)) => {}
        other => panic!("expected Pipeline error, got {other:?}"),
    }
}

#[test]
fn background_run_matches_foreground_run() {
    let sim = Arc::new(standard(TimeStepPolicy::default()));
    let model = buried_source_rock_column();
    let foreground = sim.run(&model, |_| {}).unwrap();

    let slot = RunSlot::new();
    let run = BackgroundRun::spawn(Arc::clone(&sim), model, &slot).unwrap();
    let finished = run
        .events()
        .iter()
        .any(|e| e == RunEvent::Finished { succeeded: true });
    let output = run.wait().unwrap();

    assert!(finished);
    assert_eq!(output.result, foreground);
    assert!(!slot.is_active());
}

#[test]
fn background_run_can_be_cancelled() {
    let sim = Arc::new(standard(TimeStepPolicy::Fixed { step_myr: 0.01 }));
    let slot = RunSlot::new();
    let run = BackgroundRun::spawn(sim, buried_source_rock_column(), &slot).unwrap();
    run.cancel();
    match run.wait() {
        // The worker may finish before it sees the flag on a fast machine.
        Err(RunError::Cancelled { age }) => assert!(age >= 0.0),
        Ok(_) => {}
        Err(other) => panic!("expected Cancelled, got {other:?}"),
    }
    assert!(!slot.is_active());
}

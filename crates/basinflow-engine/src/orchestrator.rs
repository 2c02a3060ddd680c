//! The simulation orchestrator.
//!
//! [`Simulation`] owns a validated stage pipeline and runs it over a
//! model's schedule. A run is all-or-nothing: the first stage failure,
//! non-finite output, or cancellation ends it and no partial result is
//! returned.
//!
//! # Step sequence
//!
//! For each age on the [`Timeline`]:
//!
//! 1. Check the cancel token.
//! 2. Collect the layers deposited at this age.
//! 3. Run every stage in pipeline order against staged output buffers,
//!    scanning outputs for non-finite values before committing them.
//! 4. Copy the step's outputs into the result tables.
//! 5. Swap current and previous buffers and report progress.

use std::fmt;
use std::time::Instant;

use basinflow_core::{
    DepthInterval, LayerSummary, LayerTable, ModelState, Quantity, QuantityReader, ResolvedLayer,
    ResultData, ResultMeta, SimulationResult, StepError,
};
use basinflow_stage::{validate_pipeline, PipelinePlan, Stage, StepContext, StepFrame};

use crate::cancel::CancelToken;
use crate::config::{ConfigError, SimulationConfig, TimeStepPolicy};
use crate::error::RunError;
use crate::metrics::RunMetrics;
use crate::progress::{Progress, ProgressReporter};
use crate::store::QuantityStore;
use crate::timeline::Timeline;

/// A completed run with its timing.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// The simulated history.
    pub result: SimulationResult,
    /// Wall-clock breakdown of the run.
    pub metrics: RunMetrics,
}

/// A configured, reusable simulation.
///
/// Construction validates the pipeline once; each call to
/// [`run`](Self::run) then simulates one model from scratch. Runs share no
/// state, so one `Simulation` can serve any number of models.
///
/// # Examples
///
/// ```ignore
/// let sim = Simulation::new(SimulationConfig::new(standard_pipeline()))?;
/// let result = sim.run(&model, |p| println!("{:.0}%", p.percent))?;
/// ```
pub struct Simulation {
    stages: Vec<Box<dyn Stage>>,
    plan: PipelinePlan,
    time_step: TimeStepPolicy,
    progress_min_delta: f64,
}

impl Simulation {
    /// Validate `config` and build the simulation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let plan = validate_pipeline(&config.stages, config.time_step.max_step())?;
        Ok(Self {
            stages: config.stages,
            plan,
            time_step: config.time_step,
            progress_min_delta: config.progress_min_delta,
        })
    }

    /// Stage names in pipeline order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// The schedule policy.
    pub fn time_step(&self) -> TimeStepPolicy {
        self.time_step
    }

    /// The schedule a run of `model` would visit.
    pub fn schedule(&self, model: &ModelState) -> Result<Timeline, RunError> {
        let layers = model.resolve_layers()?;
        Ok(Timeline::build(&self.time_step, &layers))
    }

    /// Simulate `model` from its oldest deposition to present day.
    pub fn run(
        &self,
        model: &ModelState,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<SimulationResult, RunError> {
        self.execute(model, &CancelToken::new(), &mut on_progress)
            .map(|out| out.result)
    }

    /// Like [`run`](Self::run), stopping with [`RunError::Cancelled`] once
    /// `cancel` is set.
    pub fn run_cancellable(
        &self,
        model: &ModelState,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<SimulationResult, RunError> {
        self.execute(model, cancel, &mut on_progress)
            .map(|out| out.result)
    }

    /// Full run returning the result together with its metrics.
    pub fn execute(
        &self,
        model: &ModelState,
        cancel: &CancelToken,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<RunOutput, RunError> {
        let run_start = Instant::now();

        let layers = model.resolve_layers()?;
        let ages = Timeline::build(&self.time_step, &layers).into_ages();
        let mut current = QuantityStore::allocate(&self.plan, layers.len());
        let mut previous = current.clone();
        let mut data = ResultData::empty(layers.len(), ages.clone());
        let mut present: Vec<usize> = Vec::with_capacity(layers.len());
        let mut stage_us = vec![0u64; self.stages.len()];
        let mut record_us = 0u64;
        let mut reporter = ProgressReporter::new(on_progress, self.progress_min_delta, ages.len());
        let setup_us = run_start.elapsed().as_micros() as u64;

        log::info!(
            "simulation started: {} layers, {} steps from {} Ma",
            layers.len(),
            ages.len(),
            ages.first().copied().unwrap_or(0.0)
        );

        let mut frame: Option<StepFrame> = None;
        for (step, &age) in ages.iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!("simulation cancelled before {age} Ma");
                return Err(RunError::Cancelled { age });
            }
            let this_frame = match frame {
                None => StepFrame::first(age),
                Some(prev) => prev.next(age),
            };
            frame = Some(this_frame);

            present.clear();
            present.extend(
                layers
                    .iter()
                    .filter(|l| l.is_deposited_at(age))
                    .map(|l| l.index),
            );

            if let Err(e) = self.run_stages(
                &mut current,
                &previous,
                &layers,
                &present,
                model,
                this_frame,
                &mut stage_us,
            ) {
                log::warn!("simulation failed: {e}");
                return Err(e.into());
            }

            let record_start = Instant::now();
            record_step(&mut data, &current, &present, step);
            record_us += record_start.elapsed().as_micros() as u64;

            std::mem::swap(&mut current, &mut previous);
            reporter.step_done(step + 1, age);
        }

        let meta = ResultMeta {
            layers: layers.iter().map(LayerSummary::from).collect(),
        };
        let result = SimulationResult::new(meta, data)?;
        reporter.finish(ages.last().copied().unwrap_or(0.0));

        let metrics = RunMetrics {
            total_us: run_start.elapsed().as_micros() as u64,
            setup_us,
            stage_us: self
                .stages
                .iter()
                .zip(stage_us)
                .map(|(s, us)| (s.name().to_string(), us))
                .collect(),
            record_us,
            steps: ages.len(),
            layers: layers.len(),
        };
        for (name, us) in &metrics.stage_us {
            log::debug!("stage {name}: {us} us");
        }
        log::info!(
            "simulation finished: {} steps in {} us",
            metrics.steps,
            metrics.total_us
        );
        Ok(RunOutput { result, metrics })
    }

    #[allow(clippy::too_many_arguments)]
    fn run_stages(
        &self,
        current: &mut QuantityStore,
        previous: &QuantityStore,
        layers: &[ResolvedLayer],
        present: &[usize],
        model: &ModelState,
        frame: StepFrame,
        stage_us: &mut [u64],
    ) -> Result<(), StepError> {
        for (i, stage) in self.stages.iter().enumerate() {
            let Some(modes) = self.plan.write_modes_for(i) else {
                continue;
            };
            let stage_start = Instant::now();
            let mut staged = current.stage_writes(modes, previous);
            let outcome = {
                let mut ctx = StepContext::new(
                    &*current,
                    previous,
                    &mut staged,
                    layers,
                    present,
                    &model.heat_flow,
                    frame,
                );
                stage.step(&mut ctx)
            };
            let checked = outcome.and_then(|()| match staged.find_non_finite(current, present) {
                Some(err) => Err(err),
                None => Ok(()),
            });
            if let Err(reason) = checked {
                return Err(StepError::StageFailed {
                    name: stage.name().to_string(),
                    age: frame.age,
                    reason,
                });
            }
            current.commit(staged);
            stage_us[i] += stage_start.elapsed().as_micros() as u64;
        }
        Ok(())
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("stages", &self.stage_names())
            .field("time_step", &self.time_step)
            .field("progress_min_delta", &self.progress_min_delta)
            .finish()
    }
}

/// Copy the first component of each output quantity for present layers.
fn record_step(data: &mut ResultData, store: &QuantityStore, present: &[usize], step: usize) {
    let first = |q: Quantity, layer: usize| -> Option<f64> {
        let k = store.components(q)?;
        store.read(q)?.get(layer * k).copied()
    };

    for &layer in present {
        if let (Some(top), Some(bottom)) = (
            first(Quantity::BurialTop, layer),
            first(Quantity::BurialBottom, layer),
        ) {
            data.burial
                .set(layer, step, Some(DepthInterval { top, bottom }));
        }
        let optional: [(&mut LayerTable<Option<f64>>, Quantity); 3] = [
            (&mut data.porosity, Quantity::Porosity),
            (&mut data.temperature, Quantity::Temperature),
            (&mut data.maturity, Quantity::Maturity),
        ];
        for (table, q) in optional {
            if let Some(v) = first(q, layer) {
                table.set(layer, step, Some(v));
            }
        }
        let source: [(&mut LayerTable<f64>, Quantity); 3] = [
            (&mut data.transformation, Quantity::Transformation),
            (&mut data.generation, Quantity::Generation),
            (&mut data.expulsion, Quantity::Expulsion),
        ];
        for (table, q) in source {
            if let Some(v) = first(q, layer) {
                table.set(layer, step, v);
            }
        }
    }
}

//! Execution context passed to stages during a step.
//!
//! [`StepContext`] bundles the two read views (current step and previous
//! step), mutable write access to the stage's declared outputs, the resolved
//! layer column, and the [`StepFrame`] describing where in geologic time the
//! step sits.

use basinflow_core::{HeatFlowModel, QuantityReader, QuantityWriter, ResolvedLayer, StepIndex};

/// Where a step sits on the schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepFrame {
    /// Position on the schedule.
    pub index: StepIndex,
    /// Simulated age (Ma).
    pub age: f64,
    /// Age of the previous step, `None` at the first step.
    pub previous_age: Option<f64>,
}

impl StepFrame {
    /// Frame for the first step of a run.
    pub fn first(age: f64) -> Self {
        Self {
            index: StepIndex(0),
            age,
            previous_age: None,
        }
    }

    /// Frame for the step after `self` at `age`.
    pub fn next(&self, age: f64) -> Self {
        Self {
            index: StepIndex(self.index.0 + 1),
            age,
            previous_age: Some(self.age),
        }
    }

    /// Elapsed time since the previous step (Myr). Zero at the first step.
    pub fn dt_myr(&self) -> f64 {
        self.previous_age.map_or(0.0, |prev| prev - self.age)
    }
}

/// Execution context passed to each stage's `step()`.
///
/// Accessors that only hand out shared data return references with the
/// context's full lifetime `'a`, so a stage can hold a read slice while it
/// writes through [`writes()`](StepContext::writes).
///
/// - **`reads()`** sees values written earlier in this step.
/// - **`reads_previous()`** sees the values committed at the previous step.
pub struct StepContext<'a> {
    reads: &'a dyn QuantityReader,
    reads_previous: &'a dyn QuantityReader,
    writes: &'a mut dyn QuantityWriter,
    layers: &'a [ResolvedLayer],
    present: &'a [usize],
    heat_flow: &'a HeatFlowModel,
    frame: StepFrame,
}

impl<'a> StepContext<'a> {
    /// Construct a step context.
    ///
    /// Typically called by the engine. For testing, construct with mock
    /// readers and writers from `basinflow-test-utils`.
    pub fn new(
        reads: &'a dyn QuantityReader,
        reads_previous: &'a dyn QuantityReader,
        writes: &'a mut dyn QuantityWriter,
        layers: &'a [ResolvedLayer],
        present: &'a [usize],
        heat_flow: &'a HeatFlowModel,
        frame: StepFrame,
    ) -> Self {
        Self {
            reads,
            reads_previous,
            writes,
            layers,
            present,
            heat_flow,
            frame,
        }
    }

    /// Current-step reader.
    pub fn reads(&self) -> &'a dyn QuantityReader {
        self.reads
    }

    /// Previous-step reader.
    pub fn reads_previous(&self) -> &'a dyn QuantityReader {
        self.reads_previous
    }

    /// Writer for the stage's declared outputs.
    pub fn writes(&mut self) -> &mut dyn QuantityWriter {
        self.writes
    }

    /// Every layer of the column, deposited or not, top to bottom.
    pub fn layers(&self) -> &'a [ResolvedLayer] {
        self.layers
    }

    /// Indices of layers deposited at this age, top to bottom.
    pub fn present(&self) -> &'a [usize] {
        self.present
    }

    /// Step position and ages.
    pub fn frame(&self) -> StepFrame {
        self.frame
    }

    /// Simulated age (Ma).
    pub fn age(&self) -> f64 {
        self.frame.age
    }

    /// Elapsed time since the previous step (Myr).
    pub fn dt_myr(&self) -> f64 {
        self.frame.dt_myr()
    }

    /// Basal heat flow at this age (mW/m²).
    pub fn heat_flow(&self) -> f64 {
        self.heat_flow.value_at(self.frame.age)
    }

    /// Whether `layer` was already deposited at the previous step.
    ///
    /// Layers deposited at this step have no history to integrate from.
    pub fn was_present(&self, layer: &ResolvedLayer) -> bool {
        self.frame
            .previous_age
            .is_some_and(|prev| layer.is_deposited_at(prev))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basinflow_core::{Layer, Quantity};
    use basinflow_test_utils::{MockQuantityReader, MockQuantityWriter};

    fn layers() -> Vec<ResolvedLayer> {
        vec![
            Layer::new("young", 10.0, 0.0, 100.0, "shale").resolve(0),
            Layer::new("old", 30.0, 10.0, 100.0, "shale").resolve(1),
        ]
    }

    #[test]
    fn context_provides_reads_and_writes() {
        let mut reader = MockQuantityReader::new();
        reader.set(Quantity::Temperature, vec![30.0, 40.0]);
        let mut writer = MockQuantityWriter::new();
        writer.add(Quantity::Maturity, 2);
        let layers = layers();
        let present = [0, 1];
        let heat_flow = HeatFlowModel::Constant(60.0);
        let frame = StepFrame::first(30.0).next(10.0);

        let mut ctx = StepContext::new(
            &reader, &reader, &mut writer, &layers, &present, &heat_flow, frame,
        );

        let temps = ctx.reads().read(Quantity::Temperature).unwrap();
        let out = ctx.writes().write(Quantity::Maturity).unwrap();
        out.copy_from_slice(temps);
        assert_eq!(ctx.age(), 10.0);
        assert_eq!(ctx.dt_myr(), 20.0);
        assert_eq!(ctx.heat_flow(), 60.0);
        assert_eq!(ctx.frame().index, StepIndex(1));
        assert_eq!(writer.get(Quantity::Maturity).unwrap(), &[30.0, 40.0]);
    }

    #[test]
    fn reads_and_reads_previous_are_distinct() {
        let mut current = MockQuantityReader::new();
        current.set(Quantity::Temperature, vec![50.0]);
        let mut previous = MockQuantityReader::new();
        previous.set(Quantity::Temperature, vec![45.0]);
        let mut writer = MockQuantityWriter::new();
        let layers = layers();
        let heat_flow = HeatFlowModel::Constant(60.0);

        let ctx = StepContext::new(
            &current,
            &previous,
            &mut writer,
            &layers,
            &[],
            &heat_flow,
            StepFrame::first(5.0),
        );
        assert_eq!(ctx.reads().read(Quantity::Temperature).unwrap(), &[50.0]);
        assert_eq!(
            ctx.reads_previous().read(Quantity::Temperature).unwrap(),
            &[45.0]
        );
    }

    #[test]
    fn newly_deposited_layer_was_not_present() {
        let reader = MockQuantityReader::new();
        let mut writer = MockQuantityWriter::new();
        let layers = layers();
        let heat_flow = HeatFlowModel::Constant(60.0);
        let frame = StepFrame::first(15.0).next(10.0);

        let ctx = StepContext::new(
            &reader, &reader, &mut writer, &layers, &[0, 1], &heat_flow, frame,
        );
        assert!(!ctx.was_present(&layers[0]));
        assert!(ctx.was_present(&layers[1]));
    }

    #[test]
    fn first_frame_has_no_history() {
        let frame = StepFrame::first(100.0);
        assert_eq!(frame.dt_myr(), 0.0);
        assert_eq!(frame.previous_age, None);
    }
}

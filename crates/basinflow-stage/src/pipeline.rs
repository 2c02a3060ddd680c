//! Pipeline validation and buffer planning.
//!
//! [`validate_pipeline`] runs once before a simulation starts. It checks the
//! stage list for structural errors and builds the [`PipelinePlan`] the
//! engine uses to allocate quantity buffers and initialise each stage's
//! writes.

use basinflow_core::Quantity;
use indexmap::IndexMap;

use crate::stage::{Stage, WriteMode};

use std::error::Error;
use std::fmt;

// ── Plan ───────────────────────────────────────────────────────────

/// Who writes each quantity, how wide it is, and how its buffer is seeded.
///
/// Built once by [`validate_pipeline`].
#[derive(Debug)]
#[must_use]
pub struct PipelinePlan {
    /// `writers[quantity]` = index of the writing stage, in pipeline order.
    writers: IndexMap<Quantity, usize>,
    /// Values per layer for each written quantity.
    components: IndexMap<Quantity, usize>,
    /// `write_modes[stage_index]` maps `Quantity → WriteMode`.
    write_modes: Vec<IndexMap<Quantity, WriteMode>>,
}

impl PipelinePlan {
    /// Number of stages in the plan.
    pub fn len(&self) -> usize {
        self.write_modes.len()
    }

    /// Whether the plan covers zero stages.
    pub fn is_empty(&self) -> bool {
        self.write_modes.is_empty()
    }

    /// Index of the stage that writes `quantity`.
    pub fn writer_of(&self, quantity: Quantity) -> Option<usize> {
        self.writers.get(&quantity).copied()
    }

    /// Values per layer for `quantity`, if any stage writes it.
    pub fn components(&self, quantity: Quantity) -> Option<usize> {
        self.components.get(&quantity).copied()
    }

    /// Every written quantity with its width, in pipeline order.
    pub fn quantities(&self) -> impl Iterator<Item = (Quantity, usize)> + '_ {
        self.components.iter().map(|(&q, &k)| (q, k))
    }

    /// All `(quantity, mode)` pairs for a stage's writes.
    pub fn write_modes_for(&self, stage_index: usize) -> Option<&IndexMap<Quantity, WriteMode>> {
        self.write_modes.get(stage_index)
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// A quantity written by two stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteConflict {
    /// The contested quantity.
    pub quantity: Quantity,
    /// Name of the earlier writer.
    pub first_writer: String,
    /// Name of the later writer.
    pub second_writer: String,
}

/// Errors from pipeline validation.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// No stages registered.
    EmptyPipeline,

    /// Two or more stages write the same quantity.
    WriteConflict(Vec<WriteConflict>),

    /// A stage reads a quantity no earlier stage writes in the same step.
    UnresolvedRead {
        /// Which stage.
        stage: String,
        /// The quantity it reads.
        quantity: Quantity,
    },

    /// A stage reads a previous-step quantity no stage writes.
    UnresolvedPrevious {
        /// Which stage.
        stage: String,
        /// The quantity it reads.
        quantity: Quantity,
    },

    /// A stage declares zero values per layer for a written quantity.
    InvalidComponents {
        /// Which stage.
        stage: String,
        /// The quantity.
        quantity: Quantity,
    },

    /// The schedule's largest step exceeds a stage's `max_step_myr`.
    StepTooLarge {
        /// The step that was requested (Myr).
        step_myr: f64,
        /// The tightest constraint (Myr).
        max_supported: f64,
        /// Which stage constrains it.
        constraining_stage: String,
    },

    /// The requested step is NaN, infinite, zero or negative.
    InvalidStep {
        /// The invalid value.
        value: f64,
    },

    /// A stage's `max_step_myr()` returned a non-finite or non-positive value.
    InvalidMaxStep {
        /// Which stage.
        stage: String,
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPipeline => write!(f, "pipeline has no stages"),
            Self::WriteConflict(conflicts) => {
                write!(f, "write-write conflicts: ")?;
                for (i, c) in conflicts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "{} written by '{}' and '{}'",
                        c.quantity, c.first_writer, c.second_writer,
                    )?;
                }
                Ok(())
            }
            Self::UnresolvedRead { stage, quantity } => write!(
                f,
                "stage '{stage}' reads {quantity}, which no earlier stage writes"
            ),
            Self::UnresolvedPrevious { stage, quantity } => write!(
                f,
                "stage '{stage}' reads previous {quantity}, which no stage writes"
            ),
            Self::InvalidComponents { stage, quantity } => write!(
                f,
                "stage '{stage}' declares zero components for {quantity}"
            ),
            Self::StepTooLarge {
                step_myr,
                max_supported,
                constraining_stage,
            } => write!(
                f,
                "step {step_myr} Myr exceeds max step {max_supported} Myr \
                 (constrained by '{constraining_stage}')"
            ),
            Self::InvalidStep { value } => {
                write!(f, "step must be finite and positive, got {value}")
            }
            Self::InvalidMaxStep { stage, value } => write!(
                f,
                "stage '{stage}' returned invalid max step: {value} \
                 (must be finite and positive)"
            ),
        }
    }
}

impl Error for PipelineError {}

// ── Validation ─────────────────────────────────────────────────────

/// Validate a stage pipeline and build the [`PipelinePlan`].
///
/// Checks performed:
///
/// 0. `step_myr` is finite and positive.
/// 1. Pipeline is non-empty.
/// 2. No write-write conflicts.
/// 3. Every written quantity has at least one value per layer.
/// 4. Every `reads()` quantity is written by an earlier stage, and every
///    `reads_previous()` quantity by some stage.
/// 5. `step_myr <= min(max_step_myr)` across all stages.
pub fn validate_pipeline(
    stages: &[Box<dyn Stage>],
    step_myr: f64,
) -> Result<PipelinePlan, PipelineError> {
    // 0. Step must be finite and positive
    if !step_myr.is_finite() || step_myr <= 0.0 {
        return Err(PipelineError::InvalidStep { value: step_myr });
    }

    // 1. Non-empty
    if stages.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    // 2. Write-write conflicts
    let mut writers: IndexMap<Quantity, usize> = IndexMap::new();
    {
        let mut conflicts: Vec<WriteConflict> = Vec::new();
        for (i, stage) in stages.iter().enumerate() {
            for (quantity, _mode) in stage.writes() {
                if let Some(&j) = writers.get(&quantity) {
                    conflicts.push(WriteConflict {
                        quantity,
                        first_writer: stages[j].name().to_string(),
                        second_writer: stage.name().to_string(),
                    });
                }
                writers.insert(quantity, i);
            }
        }
        if !conflicts.is_empty() {
            return Err(PipelineError::WriteConflict(conflicts));
        }
    }

    // 3. Component widths
    let mut components: IndexMap<Quantity, usize> = IndexMap::new();
    for stage in stages {
        for (quantity, _) in stage.writes() {
            let k = stage.components(quantity);
            if k == 0 {
                return Err(PipelineError::InvalidComponents {
                    stage: stage.name().to_string(),
                    quantity,
                });
            }
            components.insert(quantity, k);
        }
    }

    // 4. Read resolution
    for (i, stage) in stages.iter().enumerate() {
        for quantity in stage.reads().iter() {
            match writers.get(&quantity) {
                Some(&w) if w < i => {}
                _ => {
                    return Err(PipelineError::UnresolvedRead {
                        stage: stage.name().to_string(),
                        quantity,
                    })
                }
            }
        }
        for quantity in stage.reads_previous().iter() {
            if !writers.contains_key(&quantity) {
                return Err(PipelineError::UnresolvedPrevious {
                    stage: stage.name().to_string(),
                    quantity,
                });
            }
        }
    }

    // 5. Step bound
    {
        let mut min_max_step = f64::INFINITY;
        let mut constraining = String::new();
        for stage in stages {
            if let Some(max) = stage.max_step_myr() {
                if !max.is_finite() || max <= 0.0 {
                    return Err(PipelineError::InvalidMaxStep {
                        stage: stage.name().to_string(),
                        value: max,
                    });
                }
                if max < min_max_step {
                    min_max_step = max;
                    constraining = stage.name().to_string();
                }
            }
        }
        if step_myr > min_max_step {
            return Err(PipelineError::StepTooLarge {
                step_myr,
                max_supported: min_max_step,
                constraining_stage: constraining,
            });
        }
    }

    let write_modes = stages
        .iter()
        .map(|stage| stage.writes().into_iter().collect())
        .collect();

    Ok(PipelinePlan {
        writers,
        components,
        write_modes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StepContext;
    use basinflow_core::{QuantitySet, StageError};

    struct Probe {
        name: &'static str,
        reads: QuantitySet,
        reads_previous: QuantitySet,
        writes: Vec<(Quantity, WriteMode)>,
        width: usize,
        max_step: Option<f64>,
    }

    impl Probe {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                reads: QuantitySet::empty(),
                reads_previous: QuantitySet::empty(),
                writes: Vec::new(),
                width: 1,
                max_step: None,
            }
        }

        fn reading(mut self, q: Quantity) -> Self {
            self.reads.insert(q);
            self
        }

        fn reading_previous(mut self, q: Quantity) -> Self {
            self.reads_previous.insert(q);
            self
        }

        fn writing(mut self, q: Quantity) -> Self {
            self.writes.push((q, WriteMode::Full));
            self
        }

        fn boxed(self) -> Box<dyn Stage> {
            Box::new(self)
        }
    }

    impl Stage for Probe {
        fn name(&self) -> &str {
            self.name
        }
        fn reads(&self) -> QuantitySet {
            self.reads
        }
        fn reads_previous(&self) -> QuantitySet {
            self.reads_previous
        }
        fn writes(&self) -> Vec<(Quantity, WriteMode)> {
            self.writes.clone()
        }
        fn components(&self, _quantity: Quantity) -> usize {
            self.width
        }
        fn max_step_myr(&self) -> Option<f64> {
            self.max_step
        }
        fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), StageError> {
            Ok(())
        }
    }

    #[test]
    fn empty_pipeline_fails() {
        match validate_pipeline(&[], 1.0) {
            Err(PipelineError::EmptyPipeline) => {}
            other => panic!("expected EmptyPipeline, got {other:?}"),
        }
    }

    #[test]
    fn chained_pipeline_validates() {
        let stages = vec![
            Probe::new("burial").writing(Quantity::BurialTop).boxed(),
            Probe::new("heat")
                .reading(Quantity::BurialTop)
                .writing(Quantity::Temperature)
                .boxed(),
        ];
        let plan = validate_pipeline(&stages, 1.0).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.writer_of(Quantity::Temperature), Some(1));
        assert_eq!(plan.components(Quantity::BurialTop), Some(1));
        assert_eq!(
            plan.write_modes_for(1).unwrap().get(&Quantity::Temperature),
            Some(&WriteMode::Full)
        );
        let qs: Vec<_> = plan.quantities().map(|(q, _)| q).collect();
        assert_eq!(qs, vec![Quantity::BurialTop, Quantity::Temperature]);
    }

    #[test]
    fn write_conflict_names_both_stages() {
        let stages = vec![
            Probe::new("a").writing(Quantity::Temperature).boxed(),
            Probe::new("b").writing(Quantity::Temperature).boxed(),
        ];
        match validate_pipeline(&stages, 1.0) {
            Err(PipelineError::WriteConflict(c)) => {
                assert_eq!(c.len(), 1);
                assert_eq!(c[0].first_writer, "a");
                assert_eq!(c[0].second_writer, "b");
            }
            other => panic!("expected WriteConflict, got {other:?}"),
        }
    }

    #[test]
    fn read_before_write_fails() {
        let stages = vec![
            Probe::new("heat")
                .reading(Quantity::BurialTop)
                .writing(Quantity::Temperature)
                .boxed(),
            Probe::new("burial").writing(Quantity::BurialTop).boxed(),
        ];
        match validate_pipeline(&stages, 1.0) {
            Err(PipelineError::UnresolvedRead { stage, quantity }) => {
                assert_eq!(stage, "heat");
                assert_eq!(quantity, Quantity::BurialTop);
            }
            other => panic!("expected UnresolvedRead, got {other:?}"),
        }
    }

    #[test]
    fn previous_read_may_come_from_later_stage() {
        let stages = vec![
            Probe::new("a")
                .reading_previous(Quantity::Maturity)
                .writing(Quantity::Temperature)
                .boxed(),
            Probe::new("b").writing(Quantity::Maturity).boxed(),
        ];
        assert!(validate_pipeline(&stages, 1.0).is_ok());
    }

    #[test]
    fn unproduced_previous_read_fails() {
        let stages = vec![Probe::new("a")
            .reading_previous(Quantity::Maturity)
            .writing(Quantity::Temperature)
            .boxed()];
        match validate_pipeline(&stages, 1.0) {
            Err(PipelineError::UnresolvedPrevious { .. }) => {}
            other => panic!("expected UnresolvedPrevious, got {other:?}"),
        }
    }

    #[test]
    fn zero_width_fails() {
        let mut probe = Probe::new("a").writing(Quantity::KerogenReactants);
        probe.width = 0;
        match validate_pipeline(&[probe.boxed()], 1.0) {
            Err(PipelineError::InvalidComponents { .. }) => {}
            other => panic!("expected InvalidComponents, got {other:?}"),
        }
    }

    #[test]
    fn step_above_max_fails() {
        let mut probe = Probe::new("kinetics").writing(Quantity::Maturity);
        probe.max_step = Some(2.0);
        let stages = vec![probe.boxed()];
        assert!(validate_pipeline(&stages, 2.0).is_ok());
        match validate_pipeline(&stages, 2.5) {
            Err(PipelineError::StepTooLarge {
                constraining_stage,
                max_supported,
                ..
            }) => {
                assert_eq!(constraining_stage, "kinetics");
                assert_eq!(max_supported, 2.0);
            }
            other => panic!("expected StepTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn invalid_step_fails() {
        let stages = vec![Probe::new("a").writing(Quantity::Maturity).boxed()];
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match validate_pipeline(&stages, bad) {
                Err(PipelineError::InvalidStep { .. }) => {}
                other => panic!("expected InvalidStep for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_max_step_fails() {
        let mut probe = Probe::new("a").writing(Quantity::Maturity);
        probe.max_step = Some(f64::NAN);
        match validate_pipeline(&[probe.boxed()], 1.0) {
            Err(PipelineError::InvalidMaxStep { .. }) => {}
            other => panic!("expected InvalidMaxStep, got {other:?}"),
        }
    }

    proptest::proptest! {
        #[test]
        fn tightest_stage_bounds_the_step(
            limits in proptest::collection::vec(0.1f64..10.0, 1..6),
            step in 0.05f64..12.0,
        ) {
            let stages: Vec<Box<dyn Stage>> = limits
                .iter()
                .enumerate()
                .map(|(i, &max)| {
                    let mut probe = Probe::new(NAMES[i]).writing(Quantity::ALL[i]);
                    probe.max_step = Some(max);
                    probe.boxed()
                })
                .collect();
            let tightest = limits.iter().copied().fold(f64::INFINITY, f64::min);
            match validate_pipeline(&stages, step) {
                Ok(_) => proptest::prop_assert!(step <= tightest),
                Err(PipelineError::StepTooLarge { max_supported, constraining_stage, .. }) => {
                    proptest::prop_assert!(step > tightest);
                    proptest::prop_assert_eq!(max_supported, tightest);
                    let index = limits.iter().position(|&l| l == tightest).unwrap();
                    proptest::prop_assert_eq!(constraining_stage, NAMES[index]);
                }
                Err(other) => proptest::prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }

    const NAMES: [&str; 6] = ["s0", "s1", "s2", "s3", "s4", "s5"];
}

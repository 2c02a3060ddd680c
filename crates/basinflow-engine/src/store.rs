//! Per-layer quantity buffers for a running simulation.
//!
//! The engine keeps two [`QuantityStore`]s: `current` for the step being
//! computed and `previous` for the last committed step. Before a stage runs,
//! its declared outputs are moved out of `current` into [`StagedWrites`]
//! (zeroed for `Full` writes, seeded from `previous` for `Incremental`
//! ones). The stage reads `current` and `previous` while it writes the
//! staged buffers, and the engine commits them back afterwards. At the end
//! of a step the two stores swap roles.

use basinflow_core::{Quantity, QuantityReader, QuantityWriter, StageError};
use basinflow_stage::{PipelinePlan, WriteMode};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Layer-major buffers for every quantity the pipeline writes.
#[derive(Clone, Debug, Default)]
pub(crate) struct QuantityStore {
    buffers: IndexMap<Quantity, Buffer>,
}

#[derive(Clone, Debug)]
struct Buffer {
    components: usize,
    data: Vec<f64>,
}

impl QuantityStore {
    /// Zeroed buffers sized for `layers` layers from the plan's widths.
    pub(crate) fn allocate(plan: &PipelinePlan, layers: usize) -> Self {
        let buffers = plan
            .quantities()
            .map(|(q, components)| {
                (
                    q,
                    Buffer {
                        components,
                        data: vec![0.0; layers * components],
                    },
                )
            })
            .collect();
        Self { buffers }
    }

    /// Values per layer of `quantity`.
    pub(crate) fn components(&self, quantity: Quantity) -> Option<usize> {
        self.buffers.get(&quantity).map(|b| b.components)
    }

    /// Move the stage's outputs out of the store and prepare them for
    /// writing.
    pub(crate) fn stage_writes(
        &mut self,
        modes: &IndexMap<Quantity, WriteMode>,
        previous: &QuantityStore,
    ) -> StagedWrites {
        let mut staged = StagedWrites::default();
        for (&quantity, &mode) in modes {
            let Some(buffer) = self.buffers.get_mut(&quantity) else {
                continue;
            };
            let mut data = std::mem::take(&mut buffer.data);
            match mode {
                WriteMode::Full => data.fill(0.0),
                WriteMode::Incremental => match previous.read(quantity) {
                    Some(prev) if prev.len() == data.len() => data.copy_from_slice(prev),
                    _ => data.fill(0.0),
                },
            }
            staged.buffers.push((quantity, data));
        }
        staged
    }

    /// Put staged buffers back in place.
    pub(crate) fn commit(&mut self, staged: StagedWrites) {
        for (quantity, data) in staged.buffers {
            if let Some(buffer) = self.buffers.get_mut(&quantity) {
                buffer.data = data;
            }
        }
    }
}

impl QuantityReader for QuantityStore {
    fn read(&self, quantity: Quantity) -> Option<&[f64]> {
        self.buffers.get(&quantity).map(|b| b.data.as_slice())
    }
}

/// A stage's output buffers while it runs.
#[derive(Debug, Default)]
pub(crate) struct StagedWrites {
    buffers: SmallVec<[(Quantity, Vec<f64>); 4]>,
}

impl StagedWrites {
    /// First non-finite value among `present` layers, if any.
    pub(crate) fn find_non_finite(
        &self,
        store: &QuantityStore,
        present: &[usize],
    ) -> Option<StageError> {
        for (quantity, data) in &self.buffers {
            let k = store.components(*quantity).unwrap_or(1);
            for &layer in present {
                let values = data.get(layer * k..(layer + 1) * k).unwrap_or(&[]);
                if values.iter().any(|v| !v.is_finite()) {
                    return Some(StageError::NonFinite {
                        quantity: *quantity,
                        layer: Some(layer),
                    });
                }
            }
        }
        None
    }
}

impl QuantityWriter for StagedWrites {
    fn write(&mut self, quantity: Quantity) -> Option<&mut [f64]> {
        self.buffers
            .iter_mut()
            .find(|(q, _)| *q == quantity)
            .map(|(_, data)| data.as_mut_slice())
    }
}

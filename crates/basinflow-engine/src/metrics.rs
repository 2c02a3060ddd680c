//! Per-run performance metrics.
//!
//! [`RunMetrics`] captures wall-clock timing for a whole run, enabling
//! profiling of individual stages.

/// Timing collected during one run.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Wall-clock time for the entire run.
    pub total_us: u64,
    /// Time spent building the schedule and allocating buffers.
    pub setup_us: u64,
    /// Cumulative per-stage execution times: `(name, microseconds)`, in
    /// pipeline order.
    pub stage_us: Vec<(String, u64)>,
    /// Time spent copying step outputs into the result tables.
    pub record_us: u64,
    /// Number of time steps executed.
    pub steps: usize,
    /// Number of layers in the column.
    pub layers: usize,
}

impl RunMetrics {
    /// Cumulative time of the named stage.
    pub fn stage(&self, name: &str) -> Option<u64> {
        self.stage_us
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, us)| us)
    }
}

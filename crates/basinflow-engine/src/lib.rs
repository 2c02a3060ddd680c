//! Simulation engine orchestrating BasinFlow runs.
//!
//! Provides [`Simulation`], which turns a validated stage pipeline and a
//! [`ModelState`](basinflow_core::ModelState) into a
//! [`SimulationResult`](basinflow_core::SimulationResult), stepping from
//! the oldest deposition to present day. Runs can be driven on the
//! caller's thread or moved to a worker with [`BackgroundRun`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod background;
pub mod cancel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod slot;
pub mod timeline;

mod store;

pub use background::{BackgroundRun, RunEvent};
pub use cancel::CancelToken;
pub use config::{ConfigError, SimulationConfig, TimeStepPolicy};
pub use error::RunError;
pub use metrics::RunMetrics;
pub use orchestrator::{RunOutput, Simulation};
pub use progress::{Progress, ProgressReporter};
pub use slot::{RunGuard, RunSlot};
pub use timeline::{Timeline, AGE_EPSILON};

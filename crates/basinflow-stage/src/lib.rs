//! Stage trait and step context for BasinFlow simulations.
//!
//! A simulation step runs a fixed sequence of [`Stage`]s. Each stage reads
//! quantities written earlier in the step (or committed at the previous
//! step) through a [`StepContext`] and writes its own outputs.
//! [`validate_pipeline`] checks the ordering once before a run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod stage;

pub use context::{StepContext, StepFrame};
pub use pipeline::{validate_pipeline, PipelineError, PipelinePlan, WriteConflict};
pub use stage::{Stage, WriteMode};

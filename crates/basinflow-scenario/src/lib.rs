//! Scenario persistence and comparison for BasinFlow.
//!
//! A [`Scenario`] pairs a model with the result of its last run. This
//! crate saves and loads scenarios without re-running them, exports them
//! as JSON, and compares results cell by cell.
//!
//! # Architecture
//!
//! - [`save`] / [`load`] use a custom little-endian binary codec
//! - [`result_hash`] fingerprints a result; the codec stores it and
//!   [`load`] rejects data that no longer matches
//! - [`compare_results`] reports per-table, per-cell divergences
//! - [`json`] converts scenarios, models and results with `serde_json`
//!
//! # Format
//!
//! ```text
//! [MAGIC "BFSC"] [VERSION u8] [name] [model]
//! [has_result u8] ([result hash u64] [result])?
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod file;
pub mod hash;
pub mod json;
pub mod types;

pub use compare::{
    compare_results, CellDivergence, DivergenceKind, DivergenceReport, ShapeMismatch,
};
pub use error::ScenarioError;
pub use file::{load, load_from_path, save, save_to_path};
pub use hash::result_hash;
pub use types::Scenario;

/// Magic bytes at the start of every scenario file.
pub const MAGIC: [u8; 4] = *b"BFSC";

/// Current binary format version.
///
/// History:
/// - v1: name, model, optional hashed result
pub const FORMAT_VERSION: u8 = 1;

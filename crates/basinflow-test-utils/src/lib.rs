//! Test utilities and mock types for BasinFlow development.
//!
//! Provides mock implementations of the buffer traits ([`QuantityReader`],
//! [`QuantityWriter`]), small fixture stages for pipeline and engine tests,
//! and reference stratigraphic columns.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashMap;

use basinflow_core::{Quantity, QuantityReader, QuantityWriter};

pub mod columns;
pub mod fixtures;

pub use columns::{
    buried_source_rock_column, layered_column, single_shale_layer, SOURCE_LAYER_INDEX,
};
pub use fixtures::{ConstStage, FailingStage};

/// Mock implementation of [`QuantityReader`].
///
/// Pre-populate buffers with [`set`](MockQuantityReader::set) before
/// passing to code under test.
pub struct MockQuantityReader {
    buffers: HashMap<Quantity, Vec<f64>>,
}

impl MockQuantityReader {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
        }
    }

    /// Pre-populate a quantity's buffer.
    pub fn set(&mut self, quantity: Quantity, data: Vec<f64>) {
        self.buffers.insert(quantity, data);
    }
}

impl Default for MockQuantityReader {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantityReader for MockQuantityReader {
    fn read(&self, quantity: Quantity) -> Option<&[f64]> {
        self.buffers.get(&quantity).map(|v| v.as_slice())
    }
}

/// Mock implementation of [`QuantityWriter`].
///
/// Pre-allocate buffers with [`add`](MockQuantityWriter::add), pass to code
/// under test, then inspect with [`get`](MockQuantityWriter::get).
pub struct MockQuantityWriter {
    buffers: HashMap<Quantity, Vec<f64>>,
}

impl MockQuantityWriter {
    pub fn new() -> Self {
        Self {
            buffers: HashMap::new(),
        }
    }

    /// Pre-allocate a zeroed buffer of `len` values.
    pub fn add(&mut self, quantity: Quantity, len: usize) {
        self.buffers.insert(quantity, vec![0.0; len]);
    }

    /// Read back a buffer for assertions.
    pub fn get(&self, quantity: Quantity) -> Option<&[f64]> {
        self.buffers.get(&quantity).map(|v| v.as_slice())
    }
}

impl Default for MockQuantityWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantityWriter for MockQuantityWriter {
    fn write(&mut self, quantity: Quantity) -> Option<&mut [f64]> {
        self.buffers.get_mut(&quantity).map(|v| v.as_mut_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_returns_what_was_set() {
        let mut r = MockQuantityReader::new();
        r.set(Quantity::Porosity, vec![0.3, 0.2]);
        assert_eq!(r.read(Quantity::Porosity), Some(&[0.3, 0.2][..]));
        assert_eq!(r.read(Quantity::Maturity), None);
    }

    #[test]
    fn writer_round_trips() {
        let mut w = MockQuantityWriter::new();
        w.add(Quantity::Generation, 3);
        w.write(Quantity::Generation).unwrap()[1] = 7.0;
        assert_eq!(w.get(Quantity::Generation), Some(&[0.0, 7.0, 0.0][..]));
    }
}

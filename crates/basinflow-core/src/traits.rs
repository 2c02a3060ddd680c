//! Buffer access traits used by stages.
//!
//! Buffers are layer-major: a quantity with `k` components per layer stores
//! layer `i`'s values at `[i * k .. (i + 1) * k]`. Slots of layers that are
//! not yet deposited are present but hold no meaningful value.

use crate::quantity::Quantity;

/// Read-only access to quantity buffers within a simulation step.
///
/// Returns `None` if the quantity is not readable in the current context.
pub trait QuantityReader {
    /// Read the buffer for a quantity as a flat slice.
    fn read(&self, quantity: Quantity) -> Option<&[f64]>;
}

/// Mutable access to quantity buffers within a simulation step.
///
/// Returns `None` if the quantity is not writable in the current context.
pub trait QuantityWriter {
    /// Get a mutable slice for writing a quantity.
    fn write(&mut self, quantity: Quantity) -> Option<&mut [f64]>;
}

//! Dense layer-major tables.

use serde::{Deserialize, Serialize};

/// A dense `[layer][step]` table stored as one layer-major buffer.
///
/// Row `i` is layer `i`'s full history, contiguous in memory. Serialises
/// as a nested array of rows so JSON consumers keep `[layer][time]`
/// indexing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<T>>", into = "Vec<Vec<T>>")]
#[serde(bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct LayerTable<T> {
    layers: usize,
    steps: usize,
    cells: Vec<T>,
}

impl<T: Clone> LayerTable<T> {
    /// A `layers × steps` table with every cell set to `fill`.
    pub fn filled(layers: usize, steps: usize, fill: T) -> Self {
        Self {
            layers,
            steps,
            cells: vec![fill; layers * steps],
        }
    }
}

impl<T> LayerTable<T> {
    /// Number of rows.
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Number of columns.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The cell at `[layer][step]`.
    pub fn get(&self, layer: usize, step: usize) -> Option<&T> {
        if layer < self.layers && step < self.steps {
            self.cells.get(layer * self.steps + step)
        } else {
            None
        }
    }

    /// Overwrite the cell at `[layer][step]`. Returns `false` if out of range.
    pub fn set(&mut self, layer: usize, step: usize, value: T) -> bool {
        if layer < self.layers && step < self.steps {
            self.cells[layer * self.steps + step] = value;
            true
        } else {
            false
        }
    }

    /// Layer `layer`'s history, oldest step first.
    pub fn row(&self, layer: usize) -> Option<&[T]> {
        if layer < self.layers {
            let start = layer * self.steps;
            Some(&self.cells[start..start + self.steps])
        } else {
            None
        }
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.layers).map(move |i| {
            let start = i * self.steps;
            &self.cells[start..start + self.steps]
        })
    }

    /// The raw layer-major buffer.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Build from a raw layer-major buffer.
    pub fn from_cells(layers: usize, steps: usize, cells: Vec<T>) -> Result<Self, String> {
        if cells.len() != layers * steps {
            return Err(format!(
                "buffer holds {} cells, expected {layers} x {steps}",
                cells.len()
            ));
        }
        Ok(Self {
            layers,
            steps,
            cells,
        })
    }
}

impl<T> TryFrom<Vec<Vec<T>>> for LayerTable<T> {
    type Error = String;

    fn try_from(rows: Vec<Vec<T>>) -> Result<Self, Self::Error> {
        let layers = rows.len();
        let steps = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(layers * steps);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != steps {
                return Err(format!(
                    "row {i} has {} entries, expected {steps}",
                    row.len()
                ));
            }
            cells.extend(row);
        }
        Ok(Self {
            layers,
            steps,
            cells,
        })
    }
}

impl<T: Clone> From<LayerTable<T>> for Vec<Vec<T>> {
    fn from(table: LayerTable<T>) -> Self {
        table.rows().map(<[T]>::to_vec).collect()
    }
}

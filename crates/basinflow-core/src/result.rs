//! The immutable output of one simulation run.
//!
//! A [`SimulationResult`] carries layer summaries and a set of `[layer][time]`
//! tables sharing one time axis. Construction checks that every table's
//! shape agrees with the summaries and the time axis; after that the result
//! is read-only.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::LayerId;
use crate::layer::{KerogenType, ResolvedLayer};
use crate::lithology::Lithology;
use crate::table::LayerTable;

/// Summary of one input layer, in column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    /// Layer id.
    pub id: LayerId,
    /// Rock type as supplied.
    pub lithology: Lithology,
    /// Start of deposition (Ma).
    pub age_start: f64,
    /// End of deposition (Ma).
    pub age_end: f64,
    /// Nominal thickness at deposition (m).
    pub thickness: f64,
    /// Kerogen type for source layers, `None` otherwise.
    pub kerogen_type: Option<KerogenType>,
}

impl LayerSummary {
    /// Whether the layer generates hydrocarbons.
    pub fn is_source(&self) -> bool {
        self.kerogen_type.is_some()
    }
}

impl From<&ResolvedLayer> for LayerSummary {
    fn from(layer: &ResolvedLayer) -> Self {
        Self {
            id: layer.id.clone(),
            lithology: layer.lithology.clone(),
            age_start: layer.age_start,
            age_end: layer.age_end,
            thickness: layer.thickness,
            kerogen_type: layer.source.map(|s| s.kerogen_type),
        }
    }
}

/// Run-level metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultMeta {
    /// One summary per layer, top to bottom.
    pub layers: Vec<LayerSummary>,
}

/// Top and base depth of a layer (m).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthInterval {
    /// Depth of the top.
    pub top: f64,
    /// Depth of the base.
    pub bottom: f64,
}

impl DepthInterval {
    /// `bottom - top`.
    pub fn thickness(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Per-step tables.
///
/// Depth-derived tables hold `None` where the layer is not yet deposited.
/// Source-rock tables hold `0.0` there and for non-source layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    /// Simulated ages (Ma), oldest first, present day last.
    pub time_steps: Vec<f64>,
    /// Burial depth interval.
    pub burial: LayerTable<Option<DepthInterval>>,
    /// Mean layer porosity (fraction).
    pub porosity: LayerTable<Option<f64>>,
    /// Midpoint temperature (°C).
    pub temperature: LayerTable<Option<f64>>,
    /// Vitrinite reflectance (%Ro).
    pub maturity: LayerTable<Option<f64>>,
    /// Transformation ratio (fraction).
    pub transformation: LayerTable<f64>,
    /// Generation rate (kg HC / m² / Myr).
    pub generation: LayerTable<f64>,
    /// Cumulative expelled mass (kg HC / m²).
    pub expulsion: LayerTable<f64>,
}

impl ResultData {
    /// All-empty tables for `layers` layers over `time_steps`.
    pub fn empty(layers: usize, time_steps: Vec<f64>) -> Self {
        let steps = time_steps.len();
        Self {
            time_steps,
            burial: LayerTable::filled(layers, steps, None),
            porosity: LayerTable::filled(layers, steps, None),
            temperature: LayerTable::filled(layers, steps, None),
            maturity: LayerTable::filled(layers, steps, None),
            transformation: LayerTable::filled(layers, steps, 0.0),
            generation: LayerTable::filled(layers, steps, 0.0),
            expulsion: LayerTable::filled(layers, steps, 0.0),
        }
    }

    fn shapes(&self) -> [(&'static str, usize, usize); 7] {
        [
            ("burial", self.burial.layers(), self.burial.steps()),
            ("porosity", self.porosity.layers(), self.porosity.steps()),
            ("temperature", self.temperature.layers(), self.temperature.steps()),
            ("maturity", self.maturity.layers(), self.maturity.steps()),
            (
                "transformation",
                self.transformation.layers(),
                self.transformation.steps(),
            ),
            ("generation", self.generation.layers(), self.generation.steps()),
            ("expulsion", self.expulsion.layers(), self.expulsion.steps()),
        ]
    }
}

/// A result whose tables disagree with its metadata or time axis.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeError {
    /// The time axis is empty.
    NoTimeSteps,
    /// Ages are not strictly decreasing, or not finite.
    UnorderedTimeSteps {
        /// Index of the first offending age.
        index: usize,
    },
    /// A table's row count differs from the number of layer summaries.
    LayerCount {
        /// Table name.
        table: &'static str,
        /// Number of layer summaries.
        expected: usize,
        /// Rows in the table.
        actual: usize,
    },
    /// A table's column count differs from the time axis length.
    StepCount {
        /// Table name.
        table: &'static str,
        /// Length of the time axis.
        expected: usize,
        /// Columns in the table.
        actual: usize,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTimeSteps => write!(f, "result has no time steps"),
            Self::UnorderedTimeSteps { index } => {
                write!(f, "time step {index} is not strictly younger than its predecessor")
            }
            Self::LayerCount {
                table,
                expected,
                actual,
            } => write!(f, "table '{table}' has {actual} layers, expected {expected}"),
            Self::StepCount {
                table,
                expected,
                actual,
            } => write!(f, "table '{table}' has {actual} steps, expected {expected}"),
        }
    }
}

impl Error for ShapeError {}

/// `{age, top, bottom}` burial sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BurialSample {
    /// Age (Ma).
    pub age: f64,
    /// Depth of the top (m).
    pub top: f64,
    /// Depth of the base (m).
    pub bottom: f64,
}

/// `{age, value}` sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ValueSample {
    /// Age (Ma).
    pub age: f64,
    /// Value at that age.
    pub value: f64,
}

/// One `(time, layer)` cell of the row-major export walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportRow<'a> {
    /// Index into the time axis.
    pub step: usize,
    /// Simulated age (Ma).
    pub age: f64,
    /// Index into the layer list.
    pub layer_index: usize,
    /// The layer's summary.
    pub layer: &'a LayerSummary,
    /// Burial interval, `None` before deposition.
    pub burial: Option<DepthInterval>,
    /// Mean porosity, `None` before deposition.
    pub porosity: Option<f64>,
    /// Midpoint temperature, `None` before deposition.
    pub temperature: Option<f64>,
    /// %Ro, `None` before deposition.
    pub maturity: Option<f64>,
    /// Transformation ratio.
    pub transformation: f64,
    /// Generation rate.
    pub generation: f64,
    /// Cumulative expulsion.
    pub expulsion: f64,
}

impl ExportRow<'_> {
    /// Whether the layer exists at this row's age.
    pub fn is_deposited(&self) -> bool {
        self.burial.is_some()
    }
}

#[derive(Deserialize)]
struct ResultParts {
    meta: ResultMeta,
    data: ResultData,
}

/// Immutable output of one run.
///
/// Every table is indexed `[layer][time]` with `meta().layers` giving the
/// layer order and `time_steps()` the shared age axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResultParts")]
pub struct SimulationResult {
    meta: ResultMeta,
    data: ResultData,
}

impl TryFrom<ResultParts> for SimulationResult {
    type Error = ShapeError;

    fn try_from(parts: ResultParts) -> Result<Self, Self::Error> {
        Self::new(parts.meta, parts.data)
    }
}

impl SimulationResult {
    /// Assemble a result, checking every table against the metadata and
    /// the time axis.
    pub fn new(meta: ResultMeta, data: ResultData) -> Result<Self, ShapeError> {
        if data.time_steps.is_empty() {
            return Err(ShapeError::NoTimeSteps);
        }
        for (i, age) in data.time_steps.iter().enumerate() {
            let ordered = i == 0 || *age < data.time_steps[i - 1];
            if !age.is_finite() || !ordered {
                return Err(ShapeError::UnorderedTimeSteps { index: i });
            }
        }
        let layers = meta.layers.len();
        let steps = data.time_steps.len();
        for (table, rows, cols) in data.shapes() {
            if rows != layers {
                return Err(ShapeError::LayerCount {
                    table,
                    expected: layers,
                    actual: rows,
                });
            }
            if cols != steps {
                return Err(ShapeError::StepCount {
                    table,
                    expected: steps,
                    actual: cols,
                });
            }
        }
        Ok(Self { meta, data })
    }

    /// Layer summaries.
    pub fn meta(&self) -> &ResultMeta {
        &self.meta
    }

    /// Raw tables.
    pub fn data(&self) -> &ResultData {
        &self.data
    }

    /// Shared age axis, oldest first.
    pub fn time_steps(&self) -> &[f64] {
        &self.data.time_steps
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.meta.layers.len()
    }

    /// Position of the layer with id `id`.
    pub fn layer_index(&self, id: &str) -> Option<usize> {
        self.meta.layers.iter().position(|l| l.id.as_str() == id)
    }

    /// Burial samples for deposited steps, oldest first.
    pub fn burial(&self, layer: usize) -> Vec<BurialSample> {
        self.zip_ages(self.data.burial.row(layer))
            .filter_map(|(age, cell)| {
                cell.map(|d| BurialSample {
                    age,
                    top: d.top,
                    bottom: d.bottom,
                })
            })
            .collect()
    }

    /// Mean porosity for deposited steps.
    pub fn porosity(&self, layer: usize) -> Vec<ValueSample> {
        self.present_values(self.data.porosity.row(layer))
    }

    /// Midpoint temperature for deposited steps.
    pub fn temperature(&self, layer: usize) -> Vec<ValueSample> {
        self.present_values(self.data.temperature.row(layer))
    }

    /// %Ro for deposited steps.
    pub fn maturity(&self, layer: usize) -> Vec<ValueSample> {
        self.present_values(self.data.maturity.row(layer))
    }

    /// Transformation ratio at every step.
    pub fn transformation(&self, layer: usize) -> Vec<ValueSample> {
        self.all_values(self.data.transformation.row(layer))
    }

    /// Generation rate at every step.
    pub fn generation(&self, layer: usize) -> Vec<ValueSample> {
        self.all_values(self.data.generation.row(layer))
    }

    /// Cumulative expulsion at every step.
    pub fn expulsion(&self, layer: usize) -> Vec<ValueSample> {
        self.all_values(self.data.expulsion.row(layer))
    }

    /// Row-major walk over `time_steps × layers`.
    pub fn rows(&self) -> impl Iterator<Item = ExportRow<'_>> + '_ {
        let layers = self.layer_count();
        let d = &self.data;
        d.time_steps.iter().enumerate().flat_map(move |(step, &age)| {
            (0..layers).map(move |layer_index| ExportRow {
                step,
                age,
                layer_index,
                layer: &self.meta.layers[layer_index],
                burial: d.burial.get(layer_index, step).copied().flatten(),
                porosity: d.porosity.get(layer_index, step).copied().flatten(),
                temperature: d.temperature.get(layer_index, step).copied().flatten(),
                maturity: d.maturity.get(layer_index, step).copied().flatten(),
                transformation: d
                    .transformation
                    .get(layer_index, step)
                    .copied()
                    .unwrap_or(0.0),
                generation: d.generation.get(layer_index, step).copied().unwrap_or(0.0),
                expulsion: d.expulsion.get(layer_index, step).copied().unwrap_or(0.0),
            })
        })
    }

    fn zip_ages<'a, T>(&'a self, row: Option<&'a [T]>) -> impl Iterator<Item = (f64, &'a T)> + 'a {
        self.data
            .time_steps
            .iter()
            .copied()
            .zip(row.unwrap_or(&[]))
    }

    fn present_values(&self, row: Option<&[Option<f64>]>) -> Vec<ValueSample> {
        self.zip_ages(row)
            .filter_map(|(age, cell)| cell.map(|value| ValueSample { age, value }))
            .collect()
    }

    fn all_values(&self, row: Option<&[f64]>) -> Vec<ValueSample> {
        self.zip_ages(row)
            .map(|(age, &value)| ValueSample { age, value })
            .collect()
    }
}

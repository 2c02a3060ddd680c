//! Result comparison.
//!
//! Hash-first: bit-identical results are recognised without walking the
//! tables. Otherwise every cell is compared under an absolute tolerance and
//! each difference is reported with its table, layer and step.

use basinflow_core::{DepthInterval, LayerTable, SimulationResult};

use crate::hash::result_hash;

/// How a single cell differs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DivergenceKind {
    /// Both sides hold a value and they differ by more than the tolerance.
    Value {
        /// Value in the first result.
        left: f64,
        /// Value in the second result.
        right: f64,
    },
    /// One side has a value where the other has none.
    Presence {
        /// Whether the first result has a value.
        left: bool,
        /// Whether the second result has a value.
        right: bool,
    },
}

/// One differing cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellDivergence {
    /// Table name, e.g. `"temperature"` or `"burial_top"`. The shared age
    /// axis is reported as `"time_steps"`.
    pub table: &'static str,
    /// Layer index, `None` for the age axis.
    pub layer: Option<usize>,
    /// Time-step index.
    pub step: usize,
    /// The difference.
    pub kind: DivergenceKind,
}

/// Results whose tables cannot be compared cell by cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// Layers in the first result.
    pub left_layers: usize,
    /// Layers in the second result.
    pub right_layers: usize,
    /// Steps in the first result.
    pub left_steps: usize,
    /// Steps in the second result.
    pub right_steps: usize,
}

/// Everything that differs between two results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DivergenceReport {
    /// Set when the results have different dimensions. No cells are
    /// compared in that case.
    pub shape: Option<ShapeMismatch>,
    /// Differing cells, in table order then layer-major.
    pub divergences: Vec<CellDivergence>,
}

impl DivergenceReport {
    /// Whether the results agree within tolerance.
    pub fn is_match(&self) -> bool {
        self.shape.is_none() && self.divergences.is_empty()
    }

    /// Divergences in the named table.
    pub fn in_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a CellDivergence> {
        self.divergences.iter().filter(move |d| d.table == table)
    }

    /// Largest absolute difference among value divergences.
    pub fn max_abs_difference(&self) -> f64 {
        self.divergences
            .iter()
            .filter_map(|d| match d.kind {
                DivergenceKind::Value { left, right } => Some((left - right).abs()),
                DivergenceKind::Presence { .. } => None,
            })
            .fold(0.0, f64::max)
    }
}

/// Compare two results cell by cell.
///
/// Values within `tolerance` (absolute) are equal; `tolerance = 0.0`
/// demands exact equality. Presence differences are always reported.
pub fn compare_results(
    left: &SimulationResult,
    right: &SimulationResult,
    tolerance: f64,
) -> DivergenceReport {
    if result_hash(left) == result_hash(right) {
        return DivergenceReport::default();
    }

    let (l_layers, r_layers) = (left.layer_count(), right.layer_count());
    let (l_steps, r_steps) = (left.time_steps().len(), right.time_steps().len());
    if l_layers != r_layers || l_steps != r_steps {
        return DivergenceReport {
            shape: Some(ShapeMismatch {
                left_layers: l_layers,
                right_layers: r_layers,
                left_steps: l_steps,
                right_steps: r_steps,
            }),
            divergences: Vec::new(),
        };
    }

    let mut out = Vec::new();
    let differs = |a: f64, b: f64| (a - b).abs() > tolerance;

    for (step, (&a, &b)) in left.time_steps().iter().zip(right.time_steps()).enumerate() {
        if differs(a, b) {
            out.push(CellDivergence {
                table: "time_steps",
                layer: None,
                step,
                kind: DivergenceKind::Value { left: a, right: b },
            });
        }
    }

    let (l, r) = (left.data(), right.data());
    let top = |t: &LayerTable<Option<DepthInterval>>| {
        t.cells().iter().map(|c| c.map(|d| d.top)).collect::<Vec<_>>()
    };
    let bottom = |t: &LayerTable<Option<DepthInterval>>| {
        t.cells().iter().map(|c| c.map(|d| d.bottom)).collect::<Vec<_>>()
    };
    let optional: [(&'static str, Vec<Option<f64>>, Vec<Option<f64>>); 5] = [
        ("burial_top", top(&l.burial), top(&r.burial)),
        ("burial_bottom", bottom(&l.burial), bottom(&r.burial)),
        ("porosity", l.porosity.cells().to_vec(), r.porosity.cells().to_vec()),
        ("temperature", l.temperature.cells().to_vec(), r.temperature.cells().to_vec()),
        ("maturity", l.maturity.cells().to_vec(), r.maturity.cells().to_vec()),
    ];
    for (table, a, b) in optional {
        for (i, (x, y)) in a.into_iter().zip(b).enumerate() {
            let kind = match (x, y) {
                (Some(x), Some(y)) if differs(x, y) => DivergenceKind::Value { left: x, right: y },
                (Some(_), None) | (None, Some(_)) => DivergenceKind::Presence {
                    left: x.is_some(),
                    right: y.is_some(),
                },
                _ => continue,
            };
            out.push(cell(table, i, l_steps, kind));
        }
    }

    let plain = [
        ("transformation", &l.transformation, &r.transformation),
        ("generation", &l.generation, &r.generation),
        ("expulsion", &l.expulsion, &r.expulsion),
    ];
    for (table, a, b) in plain {
        for (i, (&x, &y)) in a.cells().iter().zip(b.cells()).enumerate() {
            if differs(x, y) {
                out.push(cell(table, i, l_steps, DivergenceKind::Value { left: x, right: y }));
            }
        }
    }

    DivergenceReport {
        shape: None,
        divergences: out,
    }
}

fn cell(table: &'static str, index: usize, steps: usize, kind: DivergenceKind) -> CellDivergence {
    CellDivergence {
        table,
        layer: Some(index / steps),
        step: index % steps,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basinflow_core::{
        HeatFlowModel, Layer, LayerSummary, ModelState, ResultData, ResultMeta,
    };

    fn result(layers: usize, tweak: impl FnOnce(&mut ResultData)) -> SimulationResult {
        let stratigraphy = (0..layers)
            .map(|i| {
                let end = 2.0 * i as f64;
                Layer::new(format!("l{i}"), end + 2.0, end, 100.0, "shale")
            })
            .collect();
        let model = ModelState::new(stratigraphy, HeatFlowModel::Constant(60.0));
        let resolved = model.resolve_layers().unwrap();
        let mut data = ResultData::empty(layers, vec![2.0 * layers as f64, 1.0, 0.0]);
        for l in 0..layers {
            for s in 0..3 {
                data.temperature.set(l, s, Some(20.0 + s as f64));
            }
        }
        tweak(&mut data);
        SimulationResult::new(
            ResultMeta {
                layers: resolved.iter().map(LayerSummary::from).collect(),
            },
            data,
        )
        .unwrap()
    }

    #[test]
    fn identical_results_match() {
        let report = compare_results(&result(2, |_| {}), &result(2, |_| {}), 0.0);
        assert!(report.is_match());
    }

    #[test]
    fn value_divergence_is_located() {
        let a = result(2, |_| {});
        let b = result(2, |d| {
            d.temperature.set(1, 2, Some(30.0));
        });
        let report = compare_results(&a, &b, 1e-9);
        assert_eq!(report.divergences.len(), 1);
        let d = &report.divergences[0];
        assert_eq!(d.table, "temperature");
        assert_eq!(d.layer, Some(1));
        assert_eq!(d.step, 2);
        assert_eq!(d.kind, DivergenceKind::Value { left: 22.0, right: 30.0 });
        assert_eq!(report.max_abs_difference(), 8.0);
    }

    #[test]
    fn tolerance_absorbs_small_differences() {
        let a = result(1, |_| {});
        let b = result(1, |d| {
            d.generation.set(0, 1, 1e-12);
        });
        assert!(compare_results(&a, &b, 1e-9).is_match());
        assert_eq!(compare_results(&a, &b, 0.0).in_table("generation").count(), 1);
    }

    #[test]
    fn presence_divergence() {
        let a = result(1, |_| {});
        let b = result(1, |d| {
            d.maturity.set(0, 0, Some(0.25));
        });
        let report = compare_results(&a, &b, 1.0);
        assert_eq!(
            report.divergences[0].kind,
            DivergenceKind::Presence {
                left: false,
                right: true
            }
        );
    }

    #[test]
    fn shape_mismatch_skips_cells() {
        let report = compare_results(&result(1, |_| {}), &result(2, |_| {}), 0.0);
        assert_eq!(
            report.shape,
            Some(ShapeMismatch {
                left_layers: 1,
                right_layers: 2,
                left_steps: 3,
                right_steps: 3,
            })
        );
        assert!(report.divergences.is_empty());
        assert!(!report.is_match());
    }
}

//! Burial-history reconstruction by grain-volume conservation.
//!
//! At each simulated age the deposited layers are stacked top-down from the
//! surface. Each layer keeps the grain thickness it had when deposited at
//! the surface with its nominal thickness; its base is placed where the
//! grain volume between top and base matches, under the porosity the layer
//! would have at its current depth.

use basinflow_core::{Quantity, QuantitySet, StageError};
use basinflow_stage::{Stage, StepContext, WriteMode};
use smallvec::SmallVec;

/// Writes burial top, burial bottom and mean porosity for every deposited
/// layer.
///
/// Layers deposited at this age sit at the surface with their nominal
/// thickness. Zero-thickness layers are markers: `top == bottom` and their
/// porosity is the porosity at that depth.
#[derive(Debug, Default)]
pub struct Decompactor;

impl Decompactor {
    /// Create the stage.
    pub fn new() -> Self {
        Self
    }
}

#[derive(Clone, Copy)]
struct Interval {
    layer: usize,
    top: f64,
    bottom: f64,
    porosity: f64,
}

impl Stage for Decompactor {
    fn name(&self) -> &str {
        "Decompactor"
    }

    fn reads(&self) -> QuantitySet {
        QuantitySet::empty()
    }

    fn writes(&self) -> Vec<(Quantity, WriteMode)> {
        vec![
            (Quantity::BurialTop, WriteMode::Full),
            (Quantity::BurialBottom, WriteMode::Full),
            (Quantity::Porosity, WriteMode::Full),
        ]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), StageError> {
        let layers = ctx.layers();
        let mut stack: SmallVec<[Interval; 16]> = SmallVec::with_capacity(ctx.present().len());
        let mut depth = 0.0;
        for &i in ctx.present() {
            let layer = &layers[i];
            let law = &layer.porosity;
            let bottom = law
                .solve_bottom(depth, layer.solid_thickness)
                .ok_or_else(|| StageError::ExecutionFailed {
                    reason: format!(
                        "layer '{}': no base depth conserves {} m of grain below {} m",
                        layer.id, layer.solid_thickness, depth
                    ),
                })?;
            let span = bottom - depth;
            let porosity = if span > 0.0 {
                (1.0 - layer.solid_thickness / span).max(0.0)
            } else {
                law.porosity(depth)
            };
            stack.push(Interval {
                layer: i,
                top: depth,
                bottom,
                porosity,
            });
            depth = bottom;
        }

        for quantity in [
            Quantity::BurialTop,
            Quantity::BurialBottom,
            Quantity::Porosity,
        ] {
            let out = ctx
                .writes()
                .write(quantity)
                .ok_or_else(|| StageError::ExecutionFailed {
                    reason: format!("{quantity} not writable"),
                })?;
            for iv in &stack {
                out[iv.layer] = match quantity {
                    Quantity::BurialTop => iv.top,
                    Quantity::BurialBottom => iv.bottom,
                    _ => iv.porosity,
                };
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basinflow_core::{HeatFlowModel, Layer, ResolvedLayer};
    use basinflow_stage::StepFrame;
    use basinflow_test_utils::{MockQuantityReader, MockQuantityWriter};

    fn column() -> Vec<ResolvedLayer> {
        vec![
            Layer::new("top", 10.0, 0.0, 1000.0, "sandstone").resolve(0),
            Layer::new("marker", 20.0, 10.0, 0.0, "shale").resolve(1),
            Layer::new("base", 50.0, 20.0, 1500.0, "shale").resolve(2),
        ]
    }

    fn run(layers: &[ResolvedLayer], present: &[usize], age: f64) -> MockQuantityWriter {
        let reader = MockQuantityReader::new();
        let mut writer = MockQuantityWriter::new();
        for q in [Quantity::BurialTop, Quantity::BurialBottom, Quantity::Porosity] {
            writer.add(q, layers.len());
        }
        let heat_flow = HeatFlowModel::Constant(60.0);
        let mut ctx = StepContext::new(
            &reader,
            &reader,
            &mut writer,
            layers,
            present,
            &heat_flow,
            StepFrame::first(age),
        );
        Decompactor::new().step(&mut ctx).unwrap();
        writer
    }

    #[test]
    fn newly_deposited_layer_has_nominal_thickness() {
        let layers = column();
        let w = run(&layers, &[2], 50.0);
        let top = w.get(Quantity::BurialTop).unwrap();
        let bottom = w.get(Quantity::BurialBottom).unwrap();
        assert_eq!(top[2], 0.0);
        assert!((bottom[2] - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn layers_stack_without_gaps() {
        let layers = column();
        let w = run(&layers, &[0, 1, 2], 0.0);
        let top = w.get(Quantity::BurialTop).unwrap();
        let bottom = w.get(Quantity::BurialBottom).unwrap();
        assert_eq!(top[0], 0.0);
        assert_eq!(bottom[0], top[1]);
        assert_eq!(top[1], bottom[1]);
        assert_eq!(bottom[1], top[2]);
    }

    #[test]
    fn burial_compacts_deeper_layer() {
        let layers = column();
        let w = run(&layers, &[0, 1, 2], 0.0);
        let top = w.get(Quantity::BurialTop).unwrap();
        let bottom = w.get(Quantity::BurialBottom).unwrap();
        let porosity = w.get(Quantity::Porosity).unwrap();
        let thickness = bottom[2] - top[2];
        assert!(thickness < 1500.0);
        assert!(thickness > layers[2].solid_thickness);

        let shallow = run(&layers, &[2], 50.0);
        assert!(porosity[2] < shallow.get(Quantity::Porosity).unwrap()[2]);
    }

    #[test]
    fn undeposited_layers_are_left_untouched() {
        let layers = column();
        let w = run(&layers, &[1, 2], 15.0);
        assert_eq!(w.get(Quantity::BurialBottom).unwrap()[0], 0.0);
    }
}

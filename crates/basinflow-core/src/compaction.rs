//! Porosity-depth laws and grain-volume bookkeeping.
//!
//! A layer's grain (solid) thickness is conserved through burial while
//! its porosity follows the lithology's porosity-depth law. Given the
//! depth of a layer's top, [`PorosityLaw::solve_bottom`] finds the depth
//! of its base such that the solid thickness between the two matches.

use serde::{Deserialize, Serialize};

/// Porosity-depth relation used by a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompactionModel {
    /// Athy-type exponential law `φ(z) = φ0 · e^(−c·z)`.
    Exponential,
    /// Constant porosity `φ0` at every depth.
    Incompressible,
}

/// Compaction block of a layer definition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionParams {
    /// Porosity-depth relation.
    pub model: CompactionModel,
    /// Surface porosity (fraction, `0 <= phi0 < 1`).
    pub phi0: f64,
    /// Porosity decay constant (1/m, `>= 0`).
    pub c: f64,
}

impl CompactionParams {
    /// Check that the parameters describe a physical porosity law.
    pub fn validate(&self) -> Result<(), String> {
        if !self.phi0.is_finite() || !(0.0..1.0).contains(&self.phi0) {
            return Err(format!("phi0 must be in [0, 1), got {}", self.phi0));
        }
        if !self.c.is_finite() || self.c < 0.0 {
            return Err(format!("c must be finite and >= 0, got {}", self.c));
        }
        Ok(())
    }
}

/// Maximum Newton iterations in [`PorosityLaw::solve_bottom`].
const MAX_ITERATIONS: usize = 100;

/// Convergence tolerance (m) on the base depth.
const DEPTH_TOLERANCE: f64 = 1.0e-10;

/// A resolved porosity-depth law.
///
/// Exponential laws with `c == 0` collapse to constant porosity, which is
/// handled in closed form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PorosityLaw {
    phi0: f64,
    c: f64,
}

impl PorosityLaw {
    /// Build the law for a compaction block.
    pub fn new(params: &CompactionParams) -> Self {
        let c = match params.model {
            CompactionModel::Exponential => params.c,
            CompactionModel::Incompressible => 0.0,
        };
        Self {
            phi0: params.phi0,
            c,
        }
    }

    /// Surface porosity.
    pub fn phi0(&self) -> f64 {
        self.phi0
    }

    /// Decay constant (1/m). Zero for incompressible layers.
    pub fn decay(&self) -> f64 {
        self.c
    }

    /// Porosity at depth `z` (m).
    pub fn porosity(&self, z: f64) -> f64 {
        if self.c == 0.0 {
            self.phi0
        } else {
            self.phi0 * (-self.c * z).exp()
        }
    }

    /// Solid (grain) thickness between depths `top` and `bottom`:
    /// `∫ (1 − φ(z)) dz`.
    pub fn solid_between(&self, top: f64, bottom: f64) -> f64 {
        let span = bottom - top;
        if self.c == 0.0 {
            span * (1.0 - self.phi0)
        } else {
            let pore = self.phi0 / self.c * ((-self.c * top).exp() - (-self.c * bottom).exp());
            span - pore
        }
    }

    /// Depth of a layer's base given the depth of its top and its solid
    /// thickness.
    ///
    /// The residual `g(b) = solid_between(top, b) − solid` is increasing and
    /// convex in `b`, so Newton's method started from the upper bound
    /// `top + solid / (1 − φ(top))` converges monotonically from above.
    /// Returns `None` if the iteration does not converge.
    pub fn solve_bottom(&self, top: f64, solid: f64) -> Option<f64> {
        if solid == 0.0 {
            return Some(top);
        }
        if self.c == 0.0 {
            return Some(top + solid / (1.0 - self.phi0));
        }

        let lower = top + solid;
        let mut b = top + solid / (1.0 - self.porosity(top));
        for _ in 0..MAX_ITERATIONS {
            let g = self.solid_between(top, b) - solid;
            let slope = 1.0 - self.porosity(b);
            let next = (b - g / slope).max(lower);
            if !next.is_finite() {
                return None;
            }
            let delta = (next - b).abs();
            b = next;
            if delta <= DEPTH_TOLERANCE * b.abs().max(1.0) {
                return Some(b);
            }
        }
        None
    }
}

//! Steady-state 1D conductive temperature solver.
//!
//! Constructed via the builder pattern: [`ThermalSolver::builder`].

use basinflow_core::units::{MICROWATT, MILLIWATT};
use basinflow_core::{Quantity, QuantitySet, StageError, SurfaceTemperature};
use basinflow_stage::{Stage, StepContext, WriteMode};

/// Midpoint temperature of every deposited layer.
///
/// The model's heat flow enters the base of the deposited column. Heat
/// produced inside the column adds to it on the way up, so the surface
/// heat flow is `q_b + Σ A·h`. Integrating downward from the surface
/// through a layer of conductivity `k` and heat production `A`:
///
/// ```text
/// T(z) = T_top + (q_top / k) · z − (A / 2k) · z²
/// q_bottom = q_top − A·h
/// ```
///
/// with `z` measured from the layer's top. Temperature is reported at
/// `z = h / 2`.
///
/// Zero conductivity in a layer of non-zero thickness yields a non-finite
/// temperature, which the engine reports as a run failure.
///
/// ```
/// use basinflow_core::SurfaceTemperature;
/// use basinflow_stages::ThermalSolver;
///
/// let solver = ThermalSolver::builder()
///     .surface_temperature(SurfaceTemperature::Constant(10.0))
///     .build()
///     .unwrap();
/// assert_eq!(solver.surface_temperature_at(50.0), 10.0);
/// ```
#[derive(Debug)]
pub struct ThermalSolver {
    surface: SurfaceTemperature,
}

/// Builder for [`ThermalSolver`].
///
/// Defaults to a constant 20 °C surface.
pub struct ThermalSolverBuilder {
    surface: SurfaceTemperature,
}

impl ThermalSolver {
    /// Create a new builder.
    pub fn builder() -> ThermalSolverBuilder {
        ThermalSolverBuilder {
            surface: SurfaceTemperature::default(),
        }
    }

    /// Surface temperature at `age` (°C).
    pub fn surface_temperature_at(&self, age: f64) -> f64 {
        self.surface.value_at(age)
    }
}

impl Default for ThermalSolver {
    fn default() -> Self {
        Self {
            surface: SurfaceTemperature::default(),
        }
    }
}

impl ThermalSolverBuilder {
    /// Surface boundary condition. Default: constant 20 °C.
    pub fn surface_temperature(mut self, surface: SurfaceTemperature) -> Self {
        self.surface = surface;
        self
    }

    /// Build the solver, validating the surface boundary condition.
    pub fn build(self) -> Result<ThermalSolver, String> {
        self.surface.validate()?;
        Ok(ThermalSolver {
            surface: self.surface,
        })
    }
}

impl Stage for ThermalSolver {
    fn name(&self) -> &str {
        "ThermalSolver"
    }

    fn reads(&self) -> QuantitySet {
        [Quantity::BurialTop, Quantity::BurialBottom]
            .into_iter()
            .collect()
    }

    fn writes(&self) -> Vec<(Quantity, WriteMode)> {
        vec![(Quantity::Temperature, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), StageError> {
        let reads = ctx.reads();
        let top = reads
            .read(Quantity::BurialTop)
            .ok_or_else(|| StageError::ExecutionFailed {
                reason: "burial_top not readable".to_string(),
            })?;
        let bottom = reads
            .read(Quantity::BurialBottom)
            .ok_or_else(|| StageError::ExecutionFailed {
                reason: "burial_bottom not readable".to_string(),
            })?;
        let layers = ctx.layers();
        let present = ctx.present();

        let radiogenic: f64 = present
            .iter()
            .map(|&i| layers[i].thermal.radiogenic_heat * MICROWATT * (bottom[i] - top[i]))
            .sum();
        let mut q = ctx.heat_flow() * MILLIWATT + radiogenic;
        let mut t = self.surface.value_at(ctx.age());

        let out = ctx
            .writes()
            .write(Quantity::Temperature)
            .ok_or_else(|| StageError::ExecutionFailed {
                reason: "temperature not writable".to_string(),
            })?;

        for &i in present {
            let h = bottom[i] - top[i];
            if h == 0.0 {
                out[i] = t;
                continue;
            }
            let k = layers[i].thermal.conductivity;
            let a = layers[i].thermal.radiogenic_heat * MICROWATT;
            let at = |z: f64| t + q / k * z - a / (2.0 * k) * z * z;
            out[i] = at(0.5 * h);
            t = at(h);
            q -= a * h;
        }
        Ok(())
    }
}

//! Vitrinite reflectance from parallel Arrhenius kinetics.
//!
//! Constructed via the builder pattern: [`MaturityKinetics::builder`].

use crate::kinetics::{KineticScheme, ReflectanceTransform};
use crate::{previous_slice, unavailable};
use basinflow_core::{Quantity, QuantitySet, StageError};
use basinflow_stage::{Stage, StepContext, WriteMode};
use smallvec::SmallVec;

/// Integrates thermal maturity (%Ro) for every deposited layer.
///
/// The unreacted fraction of each reaction is carried between steps in
/// [`Quantity::ReflectanceReactants`], one component per reaction. A layer
/// deposited at this step starts fully unreacted. A layer that was already
/// present advances from the previous step's temperature to this step's
/// temperature over the elapsed time.
///
/// Reflectance never decreases: the per-step update only shrinks the
/// unreacted fractions, and the reflectance transform is monotonic.
///
/// ```
/// use basinflow_stages::MaturityKinetics;
/// use basinflow_stage::Stage;
///
/// let stage = MaturityKinetics::builder().build().unwrap();
/// assert_eq!(stage.name(), "MaturityKinetics");
/// assert_eq!(stage.scheme().len(), 20);
/// ```
#[derive(Debug)]
pub struct MaturityKinetics {
    scheme: KineticScheme,
    transform: ReflectanceTransform,
    max_step_myr: Option<f64>,
}

/// Builder for [`MaturityKinetics`].
///
/// Defaults to Easy%Ro with no step-size limit.
pub struct MaturityKineticsBuilder {
    scheme: KineticScheme,
    transform: ReflectanceTransform,
    max_step_myr: Option<f64>,
}

impl MaturityKinetics {
    /// Create a new builder.
    pub fn builder() -> MaturityKineticsBuilder {
        MaturityKineticsBuilder {
            scheme: KineticScheme::easy_ro(),
            transform: ReflectanceTransform::EASY_RO,
            max_step_myr: None,
        }
    }

    /// The reaction scheme.
    pub fn scheme(&self) -> &KineticScheme {
        &self.scheme
    }

    /// The conversion-to-reflectance map.
    pub fn transform(&self) -> ReflectanceTransform {
        self.transform
    }
}

impl Default for MaturityKinetics {
    fn default() -> Self {
        Self {
            scheme: KineticScheme::easy_ro(),
            transform: ReflectanceTransform::EASY_RO,
            max_step_myr: None,
        }
    }
}

impl MaturityKineticsBuilder {
    /// Reaction scheme. Default: Easy%Ro.
    pub fn scheme(mut self, scheme: KineticScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Conversion-to-reflectance map. Default: Easy%Ro calibration.
    pub fn transform(mut self, transform: ReflectanceTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Largest schedule step the stage accepts (Myr).
    pub fn max_step_myr(mut self, max_step_myr: f64) -> Self {
        self.max_step_myr = Some(max_step_myr);
        self
    }

    /// Build the stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform slope is not positive, the
    /// intercept is not finite, or the step limit is not positive.
    pub fn build(self) -> Result<MaturityKinetics, String> {
        let ReflectanceTransform { a, b } = self.transform;
        if !a.is_finite() || a <= 0.0 {
            return Err(format!("reflectance slope must be positive, got {a}"));
        }
        if !b.is_finite() {
            return Err(format!("reflectance intercept must be finite, got {b}"));
        }
        if let Some(max) = self.max_step_myr {
            if !max.is_finite() || max <= 0.0 {
                return Err(format!("max_step_myr must be positive, got {max}"));
            }
        }
        Ok(MaturityKinetics {
            scheme: self.scheme,
            transform: self.transform,
            max_step_myr: self.max_step_myr,
        })
    }
}

impl Stage for MaturityKinetics {
    fn name(&self) -> &str {
        "MaturityKinetics"
    }

    fn reads(&self) -> QuantitySet {
        QuantitySet::empty().with(Quantity::Temperature)
    }

    fn reads_previous(&self) -> QuantitySet {
        [Quantity::Temperature, Quantity::ReflectanceReactants]
            .into_iter()
            .collect()
    }

    fn writes(&self) -> Vec<(Quantity, WriteMode)> {
        vec![
            (Quantity::ReflectanceReactants, WriteMode::Full),
            (Quantity::Maturity, WriteMode::Full),
        ]
    }

    fn components(&self, quantity: Quantity) -> usize {
        match quantity {
            Quantity::ReflectanceReactants => self.scheme.len(),
            _ => 1,
        }
    }

    fn max_step_myr(&self) -> Option<f64> {
        self.max_step_myr
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), StageError> {
        let n = self.scheme.len();
        let temperature = ctx
            .reads()
            .read(Quantity::Temperature)
            .ok_or_else(|| unavailable(Quantity::Temperature))?;
        let prev_temperature = previous_slice(ctx, Quantity::Temperature)?;
        let prev_reactants = previous_slice(ctx, Quantity::ReflectanceReactants)?;
        let layers = ctx.layers();
        let present = ctx.present();
        let dt = ctx.dt_myr();
        let history: SmallVec<[bool; 16]> = present
            .iter()
            .map(|&i| ctx.was_present(&layers[i]))
            .collect();

        let reactants = ctx
            .writes()
            .write(Quantity::ReflectanceReactants)
            .ok_or_else(|| unavailable(Quantity::ReflectanceReactants))?;
        let mut conversion: SmallVec<[f64; 16]> = SmallVec::with_capacity(present.len());
        for (&i, &had_history) in present.iter().zip(&history) {
            let state = &mut reactants[i * n..(i + 1) * n];
            if had_history {
                state.copy_from_slice(&prev_reactants[i * n..(i + 1) * n]);
                self.scheme
                    .advance(state, prev_temperature[i], temperature[i], dt);
            } else {
                state.fill(1.0);
            }
            conversion.push(self.scheme.conversion(state));
        }

        let maturity = ctx
            .writes()
            .write(Quantity::Maturity)
            .ok_or_else(|| unavailable(Quantity::Maturity))?;
        for (&i, &f) in present.iter().zip(&conversion) {
            maturity[i] = self.transform.reflectance(f);
        }
        Ok(())
    }
}

//! Kerogen transformation, hydrocarbon generation and expulsion.
//!
//! Constructed via the builder pattern: [`GenerationEngine::builder`].

use crate::kinetics::{KineticScheme, DEFAULT_GAUSSIAN_BINS};
use crate::{previous_slice, unavailable};
use basinflow_core::{KerogenType, Quantity, QuantitySet, StageError};
use basinflow_stage::{Stage, StepContext, WriteMode};
use smallvec::SmallVec;

/// Default fraction of the potential that must be transformed before any
/// hydrocarbon leaves the source rock.
pub const DEFAULT_EXPULSION_THRESHOLD: f64 = 0.15;

/// Transformation ratio, generation rate and cumulative expulsion of every
/// deposited source layer.
///
/// Each source layer follows the kinetic scheme of its kerogen type, with
/// the unreacted fraction of each energy bin carried between steps in
/// [`Quantity::KerogenReactants`]. Per step:
///
/// ```text
/// TR         = clamp(Σ wᵢ (1 − Rᵢ), 0, 1)
/// generation = (TR − TR_prev) / Δt · potential        (kg/m²/Myr)
/// expulsion  = potential · max(0, TR − threshold)      (kg/m²)
/// ```
///
/// where `potential = TOC · HI · grain density · grain thickness`.
/// Non-source layers carry zeros in every output.
///
/// ```
/// use basinflow_core::KerogenType;
/// use basinflow_stages::GenerationEngine;
///
/// let engine = GenerationEngine::builder()
///     .expulsion_threshold(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(engine.expulsion_threshold(), 0.2);
/// assert_eq!(engine.scheme_for(KerogenType::TypeII).len(), 21);
/// ```
#[derive(Debug)]
pub struct GenerationEngine {
    schemes: [KineticScheme; 3],
    expulsion_threshold: f64,
    max_step_myr: Option<f64>,
}

/// Builder for [`GenerationEngine`].
///
/// Defaults to Pepper & Corvi kinetics in 21 bins and a 0.15 expulsion
/// threshold.
pub struct GenerationEngineBuilder {
    bins: usize,
    overrides: [Option<KineticScheme>; 3],
    expulsion_threshold: f64,
    max_step_myr: Option<f64>,
}

fn slot(kerogen: KerogenType) -> usize {
    match kerogen {
        KerogenType::TypeI => 0,
        KerogenType::TypeII => 1,
        KerogenType::TypeIII => 2,
    }
}

const KEROGEN_TYPES: [KerogenType; 3] = [
    KerogenType::TypeI,
    KerogenType::TypeII,
    KerogenType::TypeIII,
];

impl GenerationEngine {
    /// Create a new builder.
    pub fn builder() -> GenerationEngineBuilder {
        GenerationEngineBuilder {
            bins: DEFAULT_GAUSSIAN_BINS,
            overrides: [None, None, None],
            expulsion_threshold: DEFAULT_EXPULSION_THRESHOLD,
            max_step_myr: None,
        }
    }

    /// Kinetic scheme used for `kerogen`.
    pub fn scheme_for(&self, kerogen: KerogenType) -> &KineticScheme {
        &self.schemes[slot(kerogen)]
    }

    /// Transformation ratio above which expulsion starts.
    pub fn expulsion_threshold(&self) -> f64 {
        self.expulsion_threshold
    }

    /// Reactions per kerogen scheme (all schemes share one count).
    pub fn bins(&self) -> usize {
        self.schemes[0].len()
    }
}

impl Default for GenerationEngine {
    fn default() -> Self {
        Self {
            schemes: KEROGEN_TYPES.map(KineticScheme::pepper_corvi_default),
            expulsion_threshold: DEFAULT_EXPULSION_THRESHOLD,
            max_step_myr: None,
        }
    }
}

impl GenerationEngineBuilder {
    /// Number of energy bins for the default Gaussian schemes.
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Replace the scheme for one kerogen type.
    ///
    /// Every scheme must have the same number of reactions.
    pub fn kinetics(mut self, kerogen: KerogenType, scheme: KineticScheme) -> Self {
        self.overrides[slot(kerogen)] = Some(scheme);
        self
    }

    /// Expulsion threshold in `[0, 1)`. Default: 0.15.
    pub fn expulsion_threshold(mut self, threshold: f64) -> Self {
        self.expulsion_threshold = threshold;
        self
    }

    /// Largest schedule step the stage accepts (Myr).
    pub fn max_step_myr(mut self, max_step_myr: f64) -> Self {
        self.max_step_myr = Some(max_step_myr);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range threshold or step limit, zero
    /// bins, or schemes whose reaction counts disagree.
    pub fn build(self) -> Result<GenerationEngine, String> {
        if !(0.0..1.0).contains(&self.expulsion_threshold) {
            return Err(format!(
                "expulsion threshold must be in [0, 1), got {}",
                self.expulsion_threshold
            ));
        }
        if let Some(max) = self.max_step_myr {
            if !max.is_finite() || max <= 0.0 {
                return Err(format!("max_step_myr must be positive, got {max}"));
            }
        }
        let [o1, o2, o3] = self.overrides;
        let mut built = Vec::with_capacity(3);
        for (kerogen, custom) in KEROGEN_TYPES.into_iter().zip([o1, o2, o3]) {
            let scheme = match custom {
                Some(s) => s,
                None => KineticScheme::pepper_corvi(kerogen, self.bins)?,
            };
            built.push(scheme);
        }
        let len = built[0].len();
        if let Some(odd) = built.iter().position(|s| s.len() != len) {
            return Err(format!(
                "kerogen schemes disagree on reaction count: {} has {}, {} has {}",
                KEROGEN_TYPES[0],
                len,
                KEROGEN_TYPES[odd],
                built[odd].len()
            ));
        }
        let schemes: [KineticScheme; 3] = built
            .try_into()
            .map_err(|_| "expected three kerogen schemes".to_string())?;
        Ok(GenerationEngine {
            schemes,
            expulsion_threshold: self.expulsion_threshold,
            max_step_myr: self.max_step_myr,
        })
    }
}

struct Outcome {
    layer: usize,
    transformation: f64,
    generation: f64,
    expulsion: f64,
}

impl Stage for GenerationEngine {
    fn name(&self) -> &str {
        "GenerationEngine"
    }

    fn reads(&self) -> QuantitySet {
        QuantitySet::empty().with(Quantity::Temperature)
    }

    fn reads_previous(&self) -> QuantitySet {
        [
            Quantity::Temperature,
            Quantity::KerogenReactants,
            Quantity::Transformation,
        ]
        .into_iter()
        .collect()
    }

    fn writes(&self) -> Vec<(Quantity, WriteMode)> {
        vec![
            (Quantity::KerogenReactants, WriteMode::Full),
            (Quantity::Transformation, WriteMode::Full),
            (Quantity::Generation, WriteMode::Full),
            (Quantity::Expulsion, WriteMode::Full),
        ]
    }

    fn components(&self, quantity: Quantity) -> usize {
        match quantity {
            Quantity::KerogenReactants => self.bins(),
            _ => 1,
        }
    }

    fn max_step_myr(&self) -> Option<f64> {
        self.max_step_myr
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), StageError> {
        let n = self.bins();
        let temperature = ctx
            .reads()
            .read(Quantity::Temperature)
            .ok_or_else(|| unavailable(Quantity::Temperature))?;
        let prev_temperature = previous_slice(ctx, Quantity::Temperature)?;
        let prev_reactants = previous_slice(ctx, Quantity::KerogenReactants)?;
        let prev_transformation = previous_slice(ctx, Quantity::Transformation)?;
        let layers = ctx.layers();
        let present = ctx.present();
        let dt = ctx.dt_myr();
        let history: SmallVec<[bool; 16]> = present
            .iter()
            .map(|&i| ctx.was_present(&layers[i]))
            .collect();

        let reactants = ctx
            .writes()
            .write(Quantity::KerogenReactants)
            .ok_or_else(|| unavailable(Quantity::KerogenReactants))?;
        let mut outcomes: SmallVec<[Outcome; 4]> = SmallVec::new();
        for (&i, &had_history) in present.iter().zip(&history) {
            let layer = &layers[i];
            let state = &mut reactants[i * n..(i + 1) * n];
            let Some(source) = layer.source.as_ref() else {
                state.fill(1.0);
                continue;
            };
            let scheme = self.scheme_for(source.kerogen_type);
            let prev_tr = if had_history {
                state.copy_from_slice(&prev_reactants[i * n..(i + 1) * n]);
                scheme.advance(state, prev_temperature[i], temperature[i], dt);
                prev_transformation[i]
            } else {
                state.fill(1.0);
                0.0
            };
            let tr = scheme.conversion(state).clamp(0.0, 1.0).max(prev_tr);
            let potential = layer.generative_potential();
            let generation = if dt > 0.0 {
                (tr - prev_tr) / dt * potential
            } else {
                0.0
            };
            outcomes.push(Outcome {
                layer: i,
                transformation: tr,
                generation,
                expulsion: potential * (tr - self.expulsion_threshold).max(0.0),
            });
        }

        for quantity in [
            Quantity::Transformation,
            Quantity::Generation,
            Quantity::Expulsion,
        ] {
            let out = ctx
                .writes()
                .write(quantity)
                .ok_or_else(|| unavailable(quantity))?;
            for o in &outcomes {
                out[o.layer] = match quantity {
                    Quantity::Transformation => o.transformation,
                    Quantity::Generation => o.generation,
                    _ => o.expulsion,
                };
            }
        }
        Ok(())
    }
}

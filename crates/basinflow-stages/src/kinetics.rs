//! Parallel first-order Arrhenius reaction schemes.
//!
//! A [`KineticScheme`] is a set of independent reactions sharing one
//! frequency factor, each with its own activation energy and weight. The
//! state of a scheme is the unreacted fraction `Rᵢ = 1 − Fᵢ` of each
//! reaction. Over a step from temperature `T1` to `T2` each reaction
//! advances as `Rᵢ ← Rᵢ · e^(−Iᵢ)`, where `Iᵢ` is the trapezoidal integral
//! of `A · e^(−Eᵢ/RT)` over the step. `Iᵢ >= 0`, so no `Rᵢ` ever grows and
//! the weighted conversion `Σ wᵢ (1 − Rᵢ)` never decreases.

use basinflow_core::units::{celsius_to_kelvin, GAS_CONSTANT, JOULES_PER_KCAL, SECONDS_PER_MYR};
use basinflow_core::KerogenType;

/// One reaction of a [`KineticScheme`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reaction {
    /// Stoichiometric weight.
    pub weight: f64,
    /// Activation energy (J/mol).
    pub activation_energy: f64,
}

/// A parallel first-order reaction scheme.
#[derive(Clone, Debug, PartialEq)]
pub struct KineticScheme {
    frequency_factor: f64,
    reactions: Vec<Reaction>,
}

/// Easy%Ro weights (Sweeney & Burnham 1990), for 34..=72 kcal/mol in
/// steps of 2.
const EASY_RO_WEIGHTS: [f64; 20] = [
    0.03, 0.03, 0.04, 0.04, 0.05, 0.05, 0.06, 0.04, 0.04, 0.07, 0.06, 0.06, 0.06, 0.05, 0.05, 0.04,
    0.03, 0.02, 0.02, 0.01,
];

/// Easy%Ro frequency factor (1/s).
const EASY_RO_FREQUENCY: f64 = 1.0e13;

/// Default number of bins a Gaussian energy distribution is split into.
pub const DEFAULT_GAUSSIAN_BINS: usize = 21;

/// Half-width of a discretised Gaussian, in standard deviations.
const GAUSSIAN_SPAN_SIGMA: f64 = 3.0;

impl KineticScheme {
    /// Build a scheme, checking the frequency factor and every reaction.
    pub fn new(frequency_factor: f64, reactions: Vec<Reaction>) -> Result<Self, String> {
        if !frequency_factor.is_finite() || frequency_factor <= 0.0 {
            return Err(format!(
                "frequency factor must be finite and positive, got {frequency_factor}"
            ));
        }
        if reactions.is_empty() {
            return Err("scheme has no reactions".to_string());
        }
        for (i, r) in reactions.iter().enumerate() {
            if !r.weight.is_finite() || r.weight < 0.0 {
                return Err(format!("reaction {i}: weight must be >= 0, got {}", r.weight));
            }
            if !r.activation_energy.is_finite() || r.activation_energy <= 0.0 {
                return Err(format!(
                    "reaction {i}: activation energy must be positive, got {}",
                    r.activation_energy
                ));
            }
        }
        Ok(Self {
            frequency_factor,
            reactions,
        })
    }

    /// Sweeney & Burnham (1990) Easy%Ro: 20 reactions, A = 1e13 s⁻¹.
    ///
    /// Weights sum to 0.85, the maximum attainable conversion.
    pub fn easy_ro() -> Self {
        let reactions = EASY_RO_WEIGHTS
            .iter()
            .enumerate()
            .map(|(i, &weight)| Reaction {
                weight,
                activation_energy: (34.0 + 2.0 * i as f64) * JOULES_PER_KCAL,
            })
            .collect();
        Self {
            frequency_factor: EASY_RO_FREQUENCY,
            reactions,
        }
    }

    /// A Gaussian activation-energy distribution split into `bins` equal
    /// energy intervals over ±3σ, weights normalised to 1.
    ///
    /// `mean_kj` and `sigma_kj` are in kJ/mol. A zero `sigma_kj` collapses
    /// to a single reaction.
    pub fn gaussian(
        frequency_factor: f64,
        mean_kj: f64,
        sigma_kj: f64,
        bins: usize,
    ) -> Result<Self, String> {
        if !mean_kj.is_finite() || mean_kj <= 0.0 {
            return Err(format!("mean energy must be positive, got {mean_kj}"));
        }
        if !sigma_kj.is_finite() || sigma_kj < 0.0 {
            return Err(format!("energy spread must be >= 0, got {sigma_kj}"));
        }
        if bins == 0 {
            return Err("at least one bin is required".to_string());
        }
        Self::new(frequency_factor, discretise(mean_kj, sigma_kj, bins))
    }

    /// Pepper & Corvi (1995) bulk kinetics for a kerogen type.
    ///
    /// Type I uses organofacies C, Type II organofacies B and Type III
    /// organofacies F.
    pub fn pepper_corvi(kerogen: KerogenType, bins: usize) -> Result<Self, String> {
        let (a, mean_kj, sigma_kj) = pepper_corvi_parameters(kerogen);
        Self::gaussian(a, mean_kj, sigma_kj, bins)
    }

    /// [`pepper_corvi`](Self::pepper_corvi) with
    /// [`DEFAULT_GAUSSIAN_BINS`] bins.
    pub fn pepper_corvi_default(kerogen: KerogenType) -> Self {
        let (a, mean_kj, sigma_kj) = pepper_corvi_parameters(kerogen);
        Self {
            frequency_factor: a,
            reactions: discretise(mean_kj, sigma_kj, DEFAULT_GAUSSIAN_BINS),
        }
    }

    /// Frequency factor (1/s).
    pub fn frequency_factor(&self) -> f64 {
        self.frequency_factor
    }

    /// The reactions.
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Number of reactions, i.e. state values per layer.
    pub fn len(&self) -> usize {
        self.reactions.len()
    }

    /// Whether the scheme has no reactions. Never true for a built scheme.
    pub fn is_empty(&self) -> bool {
        self.reactions.is_empty()
    }

    /// Sum of the weights: the conversion reached once every reaction is
    /// exhausted.
    pub fn total_weight(&self) -> f64 {
        self.reactions.iter().map(|r| r.weight).sum()
    }

    /// Rate constant of `reaction` at `kelvin` (1/s).
    fn rate(&self, reaction: &Reaction, kelvin: f64) -> f64 {
        self.frequency_factor * (-reaction.activation_energy / (GAS_CONSTANT * kelvin)).exp()
    }

    /// Advance the unreacted fractions over a step of `dt_myr` during which
    /// temperature moves linearly from `t1_c` to `t2_c` (°C).
    pub fn advance(&self, unreacted: &mut [f64], t1_c: f64, t2_c: f64, dt_myr: f64) {
        let dt_s = dt_myr * SECONDS_PER_MYR;
        let k1 = celsius_to_kelvin(t1_c);
        let k2 = celsius_to_kelvin(t2_c);
        for (r, reaction) in unreacted.iter_mut().zip(&self.reactions) {
            let integral = 0.5 * dt_s * (self.rate(reaction, k1) + self.rate(reaction, k2));
            *r *= (-integral).exp();
        }
    }

    /// Weighted conversion `Σ wᵢ (1 − Rᵢ)`.
    pub fn conversion(&self, unreacted: &[f64]) -> f64 {
        self.reactions
            .iter()
            .zip(unreacted)
            .map(|(reaction, r)| reaction.weight * (1.0 - r))
            .sum()
    }
}

/// Organofacies parameters: (A in 1/s, mean and σ in kJ/mol).
fn pepper_corvi_parameters(kerogen: KerogenType) -> (f64, f64, f64) {
    match kerogen {
        KerogenType::TypeI => (2.44e14, 221.6, 3.9),
        KerogenType::TypeII => (8.14e13, 215.2, 8.3),
        KerogenType::TypeIII => (1.23e17, 259.1, 6.6),
    }
}

/// Equal-width energy bins over ±3σ. `bins >= 1`.
fn discretise(mean_kj: f64, sigma_kj: f64, bins: usize) -> Vec<Reaction> {
    if sigma_kj == 0.0 || bins <= 1 {
        return vec![Reaction {
            weight: 1.0,
            activation_energy: mean_kj * 1.0e3,
        }];
    }
    let span = 2.0 * GAUSSIAN_SPAN_SIGMA;
    let z_at = |j: usize| -GAUSSIAN_SPAN_SIGMA + span * j as f64 / (bins - 1) as f64;
    let raw: Vec<f64> = (0..bins).map(|j| (-0.5 * z_at(j).powi(2)).exp()).collect();
    let total: f64 = raw.iter().sum();
    raw.iter()
        .enumerate()
        .map(|(j, w)| Reaction {
            weight: w / total,
            activation_energy: (mean_kj + sigma_kj * z_at(j)) * 1.0e3,
        })
        .collect()
}

/// Monotonic map from weighted conversion to vitrinite reflectance:
/// `Ro = e^(a·F + b)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReflectanceTransform {
    /// Slope, must be positive.
    pub a: f64,
    /// Intercept.
    pub b: f64,
}

impl ReflectanceTransform {
    /// Easy%Ro calibration: `a = 3.7`, `b = −1.6`.
    pub const EASY_RO: Self = Self { a: 3.7, b: -1.6 };

    /// %Ro for a weighted conversion `f`.
    pub fn reflectance(&self, f: f64) -> f64 {
        (self.a * f + self.b).exp()
    }
}

impl Default for ReflectanceTransform {
    fn default() -> Self {
        Self::EASY_RO
    }
}

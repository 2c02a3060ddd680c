//! Physical constants and unit conversions used across the engine.
//!
//! Ages are in Ma, durations in Myr, depths in metres, temperatures in
//! °C at the API boundary and Kelvin inside the kinetics.

/// Seconds in one million Julian years.
pub const SECONDS_PER_MYR: f64 = 3.155_76e13;

/// Universal gas constant, J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314_462_618;

/// Offset between °C and K.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Joules per thermochemical kilocalorie.
pub const JOULES_PER_KCAL: f64 = 4184.0;

/// Heat flow: mW/m² to W/m².
pub const MILLIWATT: f64 = 1.0e-3;

/// Radiogenic heat production: µW/m³ to W/m³.
pub const MICROWATT: f64 = 1.0e-6;

/// Convert °C to K.
#[inline]
pub fn celsius_to_kelvin(t: f64) -> f64 {
    t + KELVIN_OFFSET
}

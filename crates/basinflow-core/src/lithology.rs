//! Lithology classes and their default rock properties.
//!
//! Compaction defaults follow the Sclater & Christie (1980) exponential
//! porosity-depth fits; thermal defaults are representative bulk values
//! for water-saturated sediments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::compaction::{CompactionModel, CompactionParams};
use crate::layer::ThermalProps;

/// Rock type of a stratigraphic layer.
///
/// Lithologies arrive from the host as free-form names. Names the engine
/// does not recognise are kept as [`Lithology::Unrecognised`] and resolve
/// to shale's properties (see [`Lithology::defaults`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Lithology {
    /// Sandstone.
    Sandstone,
    /// Shale (also the fallback for unrecognised names).
    Shale,
    /// Limestone.
    Limestone,
    /// Evaporite salt; treated as incompressible.
    Salt,
    /// Coal.
    Coal,
    /// A lithology name with no catalog entry.
    Unrecognised(String),
}

/// Default physical properties for a lithology.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LithologyDefaults {
    /// Surface porosity (fraction).
    pub phi0: f64,
    /// Porosity decay constant (1/m).
    pub c: f64,
    /// Whether the lithology compacts at all.
    pub model: CompactionModel,
    /// Bulk thermal conductivity (W/m/K).
    pub conductivity: f64,
    /// Radiogenic heat production (µW/m³).
    pub radiogenic_heat: f64,
    /// Specific heat capacity (J/kg/K).
    pub heat_capacity: f64,
    /// Grain (matrix) density (kg/m³).
    pub grain_density: f64,
}

const SANDSTONE: LithologyDefaults = LithologyDefaults {
    phi0: 0.49,
    c: 0.27e-3,
    model: CompactionModel::Exponential,
    conductivity: 2.8,
    radiogenic_heat: 0.7,
    heat_capacity: 850.0,
    grain_density: 2650.0,
};

const SHALE: LithologyDefaults = LithologyDefaults {
    phi0: 0.63,
    c: 0.51e-3,
    model: CompactionModel::Exponential,
    conductivity: 1.8,
    radiogenic_heat: 1.0,
    heat_capacity: 900.0,
    grain_density: 2720.0,
};

const LIMESTONE: LithologyDefaults = LithologyDefaults {
    phi0: 0.51,
    c: 0.52e-3,
    model: CompactionModel::Exponential,
    conductivity: 2.6,
    radiogenic_heat: 0.6,
    heat_capacity: 860.0,
    grain_density: 2710.0,
};

const SALT: LithologyDefaults = LithologyDefaults {
    phi0: 0.0,
    c: 0.0,
    model: CompactionModel::Incompressible,
    conductivity: 5.5,
    radiogenic_heat: 0.1,
    heat_capacity: 860.0,
    grain_density: 2160.0,
};

const COAL: LithologyDefaults = LithologyDefaults {
    phi0: 0.55,
    c: 0.65e-3,
    model: CompactionModel::Exponential,
    conductivity: 0.3,
    radiogenic_heat: 0.1,
    heat_capacity: 1250.0,
    grain_density: 1350.0,
};

impl Lithology {
    /// Parse a lithology name, case-insensitively.
    ///
    /// Unknown names are preserved verbatim in [`Lithology::Unrecognised`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sandstone" | "sand" => Self::Sandstone,
            "shale" | "mudstone" => Self::Shale,
            "limestone" | "carbonate" => Self::Limestone,
            "salt" | "evaporite" => Self::Salt,
            "coal" => Self::Coal,
            _ => Self::Unrecognised(name.to_string()),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &str {
        match self {
            Self::Sandstone => "sandstone",
            Self::Shale => "shale",
            Self::Limestone => "limestone",
            Self::Salt => "salt",
            Self::Coal => "coal",
            Self::Unrecognised(name) => name,
        }
    }

    /// Whether the lithology has its own catalog entry.
    pub fn is_recognised(&self) -> bool {
        !matches!(self, Self::Unrecognised(_))
    }

    /// Catalog defaults for this lithology. Unrecognised names get shale's.
    pub fn defaults(&self) -> LithologyDefaults {
        match self {
            Self::Sandstone => SANDSTONE,
            Self::Shale | Self::Unrecognised(_) => SHALE,
            Self::Limestone => LIMESTONE,
            Self::Salt => SALT,
            Self::Coal => COAL,
        }
    }
}

impl LithologyDefaults {
    /// The compaction block these defaults imply.
    pub fn compaction(&self) -> CompactionParams {
        CompactionParams {
            model: self.model,
            phi0: self.phi0,
            c: self.c,
        }
    }

    /// The thermal block these defaults imply.
    pub fn thermal(&self) -> ThermalProps {
        ThermalProps {
            conductivity: self.conductivity,
            radiogenic_heat: self.radiogenic_heat,
            heat_capacity: self.heat_capacity,
        }
    }
}

impl fmt::Display for Lithology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<String> for Lithology {
    fn from(v: String) -> Self {
        Self::from_name(&v)
    }
}

impl From<&str> for Lithology {
    fn from(v: &str) -> Self {
        Self::from_name(v)
    }
}

impl From<Lithology> for String {
    fn from(v: Lithology) -> Self {
        v.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Lithology::from_name("Sandstone"), Lithology::Sandstone);
        assert_eq!(Lithology::from_name(" SHALE "), Lithology::Shale);
    }

    #[test]
    fn unknown_name_is_preserved() {
        let lith = Lithology::from_name("dolomite");
        assert_eq!(lith, Lithology::Unrecognised("dolomite".to_string()));
        assert_eq!(lith.name(), "dolomite");
        assert!(!lith.is_recognised());
    }

    #[test]
    fn unknown_falls_back_to_shale_compaction() {
        let fallback = Lithology::from_name("dolomite").defaults();
        let shale = Lithology::Shale.defaults();
        assert_eq!(fallback.phi0, shale.phi0);
        assert_eq!(fallback.c, shale.c);
    }

    #[test]
    fn salt_is_incompressible() {
        assert_eq!(Lithology::Salt.defaults().model, CompactionModel::Incompressible);
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&Lithology::Limestone).unwrap();
        assert_eq!(json, "\"limestone\"");
        let back: Lithology = serde_json::from_str("\"anhydrite\"").unwrap();
        assert_eq!(back, Lithology::Unrecognised("anhydrite".to_string()));
    }

    #[test]
    fn every_default_porosity_is_physical() {
        for lith in [
            Lithology::Sandstone,
            Lithology::Shale,
            Lithology::Limestone,
            Lithology::Salt,
            Lithology::Coal,
        ] {
            let d = lith.defaults();
            assert!((0.0..1.0).contains(&d.phi0), "{lith}: phi0 {}", d.phi0);
            assert!(d.c >= 0.0);
            assert!(d.conductivity > 0.0);
            assert!(d.grain_density > 0.0);
        }
    }
}

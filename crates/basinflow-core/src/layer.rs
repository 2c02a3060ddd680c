//! Stratigraphic layer definitions.
//!
//! [`Layer`] is the host-facing definition: everything optional falls back
//! to lithology defaults. [`ResolvedLayer`] is what the stages consume,
//! with every default applied and the conserved grain thickness computed.

use serde::{Deserialize, Serialize};

use crate::compaction::{CompactionParams, PorosityLaw};
use crate::error::InputError;
use crate::id::LayerId;
use crate::lithology::Lithology;

/// Kerogen classification governing oil- vs gas-proneness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KerogenType {
    /// Lacustrine, oil-prone.
    #[serde(rename = "I")]
    TypeI,
    /// Marine, oil-prone.
    #[default]
    #[serde(rename = "II")]
    TypeII,
    /// Terrigenous, gas-prone.
    #[serde(rename = "III")]
    TypeIII,
}

impl std::fmt::Display for KerogenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeI => write!(f, "Type I"),
            Self::TypeII => write!(f, "Type II"),
            Self::TypeIII => write!(f, "Type III"),
        }
    }
}

/// Source-rock richness block of a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRock {
    /// Whether the layer generates hydrocarbons.
    pub is_source: bool,
    /// Total organic carbon (wt%).
    pub toc: f64,
    /// Hydrogen index (mg HC / g TOC).
    pub hi: f64,
    /// Kerogen type selecting the kinetic scheme.
    pub kerogen_type: KerogenType,
}

/// Thermal block of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermalProps {
    /// Bulk thermal conductivity (W/m/K).
    pub conductivity: f64,
    /// Radiogenic heat production (µW/m³).
    pub radiogenic_heat: f64,
    /// Specific heat capacity (J/kg/K). Carried for the host; the
    /// steady-state solver does not use it.
    pub heat_capacity: f64,
}

/// One layer of a stratigraphic column, as supplied by the host.
///
/// `thickness` is the nominal thickness of the layer at its deposition
/// instant, when it sits at the surface with porosity `φ0` at its top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Unique id within the column.
    pub id: LayerId,
    /// Start of deposition (Ma).
    pub age_start: f64,
    /// End of deposition (Ma).
    pub age_end: f64,
    /// Nominal thickness at deposition (m).
    pub thickness: f64,
    /// Rock type.
    pub lithology: Lithology,
    /// Source-rock richness. Defaults to a non-source layer.
    #[serde(default)]
    pub source_rock: SourceRock,
    /// Thermal override. `None` uses lithology defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalProps>,
    /// Compaction override. `None` uses lithology defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compaction: Option<CompactionParams>,
}

impl Layer {
    /// A non-source layer using lithology defaults.
    pub fn new(
        id: impl Into<LayerId>,
        age_start: f64,
        age_end: f64,
        thickness: f64,
        lithology: impl Into<Lithology>,
    ) -> Self {
        Self {
            id: id.into(),
            age_start,
            age_end,
            thickness,
            lithology: lithology.into(),
            source_rock: SourceRock::default(),
            thermal: None,
            compaction: None,
        }
    }

    /// Mark the layer as a source rock.
    pub fn with_source_rock(mut self, toc: f64, hi: f64, kerogen_type: KerogenType) -> Self {
        self.source_rock = SourceRock {
            is_source: true,
            toc,
            hi,
            kerogen_type,
        };
        self
    }

    /// Override the lithology's thermal properties.
    pub fn with_thermal(mut self, thermal: ThermalProps) -> Self {
        self.thermal = Some(thermal);
        self
    }

    /// Override the lithology's compaction parameters.
    pub fn with_compaction(mut self, compaction: CompactionParams) -> Self {
        self.compaction = Some(compaction);
        self
    }

    /// Validate the layer in isolation.
    pub fn validate(&self) -> Result<(), InputError> {
        let finite = [
            ("ageStart", self.age_start),
            ("ageEnd", self.age_end),
            ("thickness", self.thickness),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(InputError::NonFiniteValue {
                    layer: self.id.clone(),
                    field: field.to_string(),
                });
            }
        }
        if self.age_end < 0.0 || self.age_start <= self.age_end {
            return Err(InputError::InvalidAgeRange {
                layer: self.id.clone(),
                age_start: self.age_start,
                age_end: self.age_end,
            });
        }
        if self.thickness < 0.0 {
            return Err(InputError::NegativeThickness {
                layer: self.id.clone(),
                thickness: self.thickness,
            });
        }
        if let Some(compaction) = &self.compaction {
            compaction
                .validate()
                .map_err(|reason| InputError::InvalidCompaction {
                    layer: self.id.clone(),
                    reason,
                })?;
        }
        if let Some(thermal) = &self.thermal {
            if !thermal.conductivity.is_finite() || thermal.conductivity < 0.0 {
                return Err(InputError::InvalidThermal {
                    layer: self.id.clone(),
                    reason: format!(
                        "conductivity must be finite and >= 0, got {}",
                        thermal.conductivity
                    ),
                });
            }
            if !thermal.radiogenic_heat.is_finite() || thermal.radiogenic_heat < 0.0 {
                return Err(InputError::InvalidThermal {
                    layer: self.id.clone(),
                    reason: format!(
                        "radiogenic heat must be finite and >= 0, got {}",
                        thermal.radiogenic_heat
                    ),
                });
            }
        }
        let sr = &self.source_rock;
        if sr.is_source {
            if !sr.toc.is_finite() || !(0.0..=100.0).contains(&sr.toc) {
                return Err(InputError::InvalidSourceRock {
                    layer: self.id.clone(),
                    reason: format!("toc must be in [0, 100] wt%, got {}", sr.toc),
                });
            }
            if !sr.hi.is_finite() || sr.hi < 0.0 {
                return Err(InputError::InvalidSourceRock {
                    layer: self.id.clone(),
                    reason: format!("hi must be finite and >= 0, got {}", sr.hi),
                });
            }
        }
        Ok(())
    }

    /// Apply lithology defaults and compute the conserved grain thickness.
    ///
    /// An unrecognised lithology without a compaction override resolves to
    /// shale's porosity law and logs a warning.
    pub fn resolve(&self, index: usize) -> ResolvedLayer {
        let defaults = self.lithology.defaults();
        let compaction = match self.compaction {
            Some(params) => params,
            None => {
                if !self.lithology.is_recognised() {
                    log::warn!(
                        "layer '{}': unrecognised lithology '{}', using shale compaction",
                        self.id,
                        self.lithology
                    );
                }
                defaults.compaction()
            }
        };
        let porosity = PorosityLaw::new(&compaction);
        let solid_thickness = porosity.solid_between(0.0, self.thickness);
        ResolvedLayer {
            index,
            id: self.id.clone(),
            age_start: self.age_start,
            age_end: self.age_end,
            thickness: self.thickness,
            lithology: self.lithology.clone(),
            porosity,
            thermal: self.thermal.unwrap_or_else(|| defaults.thermal()),
            source: self.source_rock.is_source.then_some(self.source_rock),
            solid_thickness,
            grain_density: defaults.grain_density,
        }
    }
}

/// A layer with every default applied, ready for the stages.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLayer {
    /// Position in the column (0 = top).
    pub index: usize,
    /// Layer id.
    pub id: LayerId,
    /// Start of deposition (Ma).
    pub age_start: f64,
    /// End of deposition (Ma).
    pub age_end: f64,
    /// Nominal thickness at deposition (m).
    pub thickness: f64,
    /// Rock type as supplied.
    pub lithology: Lithology,
    /// Porosity-depth law.
    pub porosity: PorosityLaw,
    /// Thermal properties.
    pub thermal: ThermalProps,
    /// Source-rock block, present only for source layers.
    pub source: Option<SourceRock>,
    /// Grain thickness (m), conserved through burial.
    pub solid_thickness: f64,
    /// Grain density (kg/m³).
    pub grain_density: f64,
}

impl ResolvedLayer {
    /// Whether the layer exists at simulated age `age` (Ma).
    #[inline]
    pub fn is_deposited_at(&self, age: f64) -> bool {
        self.age_start >= age
    }

    /// Total hydrocarbon mass the layer can generate, in kg per m² of
    /// column: `TOC · HI · grain density · grain thickness`.
    ///
    /// Zero for non-source layers.
    pub fn generative_potential(&self) -> f64 {
        match &self.source {
            Some(sr) => {
                let hc_per_rock = sr.toc / 100.0 * sr.hi * 1.0e-3;
                hc_per_rock * self.grain_density * self.solid_thickness
            }
            None => 0.0,
        }
    }
}

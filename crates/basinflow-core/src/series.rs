//! Time-dependent boundary conditions: heat flow and surface temperature.
//!
//! Both are either a constant or a piecewise-linear series over age.
//! Queries outside the series' control points hold the nearest value.

use serde::{Deserialize, Serialize};

/// One `{age, value}` control point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Age (Ma).
    pub age: f64,
    /// Value at that age.
    pub value: f64,
}

/// Piecewise-linear series over age.
///
/// Points are ordered by strictly decreasing age (oldest first), matching
/// the order ages are simulated in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeSeries {
    points: Vec<ControlPoint>,
}

impl AgeSeries {
    /// Build a series, checking point order and finiteness.
    pub fn new(points: Vec<ControlPoint>) -> Result<Self, String> {
        let series = Self { points };
        series.validate()?;
        Ok(series)
    }

    /// Build from `(age, value)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, String> {
        Self::new(
            pairs
                .iter()
                .map(|&(age, value)| ControlPoint { age, value })
                .collect(),
        )
    }

    /// The control points.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Check the series is non-empty, finite, and strictly decreasing in age.
    ///
    /// Deserialisation bypasses [`AgeSeries::new`], so model validation
    /// calls this again.
    pub fn validate(&self) -> Result<(), String> {
        if self.points.is_empty() {
            return Err("series has no control points".to_string());
        }
        for (i, p) in self.points.iter().enumerate() {
            if !p.age.is_finite() || !p.value.is_finite() {
                return Err(format!("control point {i} is not finite"));
            }
        }
        for pair in self.points.windows(2) {
            if pair[1].age >= pair[0].age {
                return Err(format!(
                    "ages must be strictly decreasing, got {} then {}",
                    pair[0].age, pair[1].age
                ));
            }
        }
        Ok(())
    }

    /// Value at `age`, interpolated linearly and clamped at both ends.
    pub fn value_at(&self, age: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return f64::NAN,
        };
        if age >= first.age {
            return first.value;
        }
        if age <= last.age {
            return last.value;
        }
        // Ages decrease along the series; find the segment bracketing `age`.
        let upper = self.points.partition_point(|p| p.age > age);
        let older = &self.points[upper - 1];
        let younger = &self.points[upper];
        let frac = (older.age - age) / (older.age - younger.age);
        older.value + frac * (younger.value - older.value)
    }
}

/// Basal heat flow entering the sediment column (mW/m²).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeatFlowModel {
    /// Same value at every age.
    Constant(f64),
    /// Piecewise-linear over age.
    Series(AgeSeries),
}

impl HeatFlowModel {
    /// Heat flow at `age` (mW/m²).
    pub fn value_at(&self, age: f64) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Series(s) => s.value_at(age),
        }
    }

    /// Check values are finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Constant(v) => check_heat_flow(*v),
            Self::Series(s) => {
                s.validate()?;
                s.points().iter().try_for_each(|p| check_heat_flow(p.value))
            }
        }
    }
}

fn check_heat_flow(v: f64) -> Result<(), String> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(format!("heat flow must be finite and >= 0, got {v}"))
    }
}

/// Temperature at the top of the column (°C).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceTemperature {
    /// Same value at every age.
    Constant(f64),
    /// Piecewise-linear over age.
    Series(AgeSeries),
}

impl SurfaceTemperature {
    /// Default surface temperature (°C).
    pub const DEFAULT_CELSIUS: f64 = 20.0;

    /// Temperature at `age` (°C).
    pub fn value_at(&self, age: f64) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Series(s) => s.value_at(age),
        }
    }

    /// Check the values are finite and above absolute zero.
    pub fn validate(&self) -> Result<(), String> {
        let check = |v: f64| {
            if v.is_finite() && v > -crate::units::KELVIN_OFFSET {
                Ok(())
            } else {
                Err(format!("surface temperature {v} °C is not physical"))
            }
        };
        match self {
            Self::Constant(v) => check(*v),
            Self::Series(s) => {
                s.validate()?;
                s.points().iter().try_for_each(|p| check(p.value))
            }
        }
    }
}

impl Default for SurfaceTemperature {
    fn default() -> Self {
        Self::Constant(Self::DEFAULT_CELSIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series() -> AgeSeries {
        AgeSeries::from_pairs(&[(100.0, 80.0), (50.0, 60.0), (0.0, 50.0)]).unwrap()
    }

    #[test]
    fn interpolates_between_points() {
        let s = series();
        assert_eq!(s.value_at(75.0), 70.0);
        assert_eq!(s.value_at(25.0), 55.0);
        assert_eq!(s.value_at(50.0), 60.0);
    }

    #[test]
    fn clamps_outside_points() {
        let s = AgeSeries::from_pairs(&[(80.0, 70.0), (20.0, 55.0)]).unwrap();
        assert_eq!(s.value_at(200.0), 70.0);
        assert_eq!(s.value_at(0.0), 55.0);
    }

    #[test]
    fn single_point_is_constant() {
        let s = AgeSeries::from_pairs(&[(30.0, 42.0)]).unwrap();
        assert_eq!(s.value_at(100.0), 42.0);
        assert_eq!(s.value_at(0.0), 42.0);
    }

    #[test]
    fn rejects_increasing_ages() {
        let err = AgeSeries::from_pairs(&[(10.0, 1.0), (20.0, 2.0)]).unwrap_err();
        assert!(err.contains("strictly decreasing"));
    }

    #[test]
    fn rejects_empty() {
        assert!(AgeSeries::new(Vec::new()).is_err());
    }

    #[test]
    fn heat_flow_rejects_negative() {
        assert!(HeatFlowModel::Constant(-5.0).validate().is_err());
        assert!(HeatFlowModel::Constant(60.0).validate().is_ok());
    }

    #[test]
    fn heat_flow_json_shape() {
        let json = serde_json::to_string(&HeatFlowModel::Constant(60.0)).unwrap();
        assert_eq!(json, r#"{"constant":60.0}"#);
        let model: HeatFlowModel =
            serde_json::from_str(r#"{"series":[{"age":10.0,"value":70.0},{"age":0.0,"value":60.0}]}"#)
                .unwrap();
        assert_eq!(model.value_at(5.0), 65.0);
    }

    #[test]
    fn surface_default_is_twenty() {
        assert_eq!(SurfaceTemperature::default().value_at(55.0), 20.0);
    }

    proptest! {
        #[test]
        fn value_stays_within_point_range(age in -50.0f64..250.0) {
            let s = series();
            let v = s.value_at(age);
            prop_assert!((50.0..=80.0).contains(&v));
        }
    }
}

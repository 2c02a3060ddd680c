//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a stratigraphic layer.
///
/// Layer ids come from the host's parameter editor and are opaque to the
/// engine; they only need to be unique within one stratigraphic column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LayerId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for LayerId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

/// Position of a simulated age within a run's time schedule.
///
/// `StepIndex(0)` is the oldest simulated age; the last index is present day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepIndex(pub usize);

impl fmt::Display for StepIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StepIndex {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

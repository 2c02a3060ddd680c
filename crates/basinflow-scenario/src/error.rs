//! Error types for scenario persistence.

use std::fmt;
use std::io;

/// Errors that can occur while saving, loading, or converting a scenario.
#[derive(Debug)]
pub enum ScenarioError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The data does not start with the expected `b"BFSC"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the data.
        found: u8,
    },
    /// The data could not be decoded (truncated, corrupt, or inconsistent).
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// An enum tag byte is not recognised.
    UnknownTag {
        /// Which enum was being decoded.
        kind: &'static str,
        /// The unrecognised tag.
        tag: u8,
    },
    /// The stored result does not hash to the recorded value.
    HashMismatch {
        /// Hash recorded in the file.
        recorded: u64,
        /// Hash of the decoded result.
        computed: u64,
    },
    /// JSON encoding or decoding failed.
    Json(serde_json::Error),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"BFSC\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed scenario: {detail}"),
            Self::UnknownTag { kind, tag } => write!(f, "unknown {kind} tag {tag}"),
            Self::HashMismatch { recorded, computed } => {
                write!(
                    f,
                    "result hash mismatch: recorded={recorded:#018x}, computed={computed:#018x}"
                )
            }
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ScenarioError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

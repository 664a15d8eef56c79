use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Collision detection mode for dynamic bodies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionQuality {
    /// Contacts are only found at the end of each step
    Discrete,
    /// Fast bodies are swept so they cannot tunnel through thin geometry
    #[serde(alias = "continuous")]
    Ccd,
}

impl MotionQuality {
    pub const ALL: [MotionQuality; 2] = [MotionQuality::Discrete, MotionQuality::Ccd];

    pub fn ccd_enabled(self) -> bool {
        matches!(self, MotionQuality::Ccd)
    }

    /// Label used in the results table and in per-frame file names
    pub fn label(self) -> &'static str {
        match self {
            MotionQuality::Discrete => "Discrete",
            MotionQuality::Ccd => "CCD",
        }
    }
}

impl fmt::Display for MotionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MotionQuality {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discrete" => Ok(MotionQuality::Discrete),
            "ccd" | "continuous" => Ok(MotionQuality::Ccd),
            _ => Err(BenchError::UnknownMotionQuality(s.to_string())),
        }
    }
}

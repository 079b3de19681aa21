use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Climate snapshots keyed by city, in the order the payload lists them.
pub type ClimateData = IndexMap<String, ClimateRecord>;

/// Per-city climate snapshot. Missing readings never satisfy a threshold except
/// `avg_temp_c`, whose fallback sits far above any realistic LOW_TEMP limit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateRecord {
    #[serde(default)]
    pub humidity_pct: f64,
    #[serde(default = "default_avg_temp_c")]
    pub avg_temp_c: f64,
    #[serde(default)]
    pub rainfall_mm: f64,
    #[serde(default)]
    pub season_tag: String,
}

fn default_avg_temp_c() -> f64 {
    100.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Northern-hemisphere meteorological seasons; anything outside 3..=11 is winter.
    pub fn from_month(month: u8) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
            Self::Winter => "WINTER",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

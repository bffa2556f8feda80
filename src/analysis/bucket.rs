//! Rate-environment buckets.

use serde::Serialize;

/// Ordinal classification of the 10-year Treasury yield at a filing date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateBucket {
    Low,
    Medium,
    High,
}

const LOW_UPPER: f64 = 2.0;
const MEDIUM_UPPER: f64 = 4.0;

impl RateBucket {
    pub const ALL: [RateBucket; 3] = [RateBucket::Low, RateBucket::Medium, RateBucket::High];

    pub fn label(self) -> &'static str {
        match self {
            RateBucket::Low => "Low (<2%)",
            RateBucket::Medium => "Medium (2-4%)",
            RateBucket::High => "High (>=4%)",
        }
    }
}

/// Half-open intervals: `[.., 2)`, `[2, 4)`, `[4, ..)`.
pub fn classify(rate: f64) -> RateBucket {
    if rate < LOW_UPPER {
        RateBucket::Low
    } else if rate < MEDIUM_UPPER {
        RateBucket::Medium
    } else {
        RateBucket::High
    }
}

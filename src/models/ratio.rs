use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative ratio that may be unbounded (zero denominator, positive numerator).
///
/// Used for profit factor everywhere so that a loss-free trade set never leaks
/// `inf`/`NaN` into a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    Unbounded,
}

impl Default for Ratio {
    fn default() -> Self {
        Ratio::Finite(0.0)
    }
}

impl Ratio {
    /// `numerator / denominator` for two magnitudes.
    ///
    /// Zero over zero is `Finite(0.0)`; positive over zero is `Unbounded`.
    pub fn of(numerator: f64, denominator: f64) -> Self {
        let n = numerator.abs();
        let d = denominator.abs();
        if d > 0.0 {
            Ratio::Finite(n / d)
        } else if n > 0.0 {
            Ratio::Unbounded
        } else {
            Ratio::Finite(0.0)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Finite(v) => Some(*v),
            Ratio::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Ratio::Unbounded)
    }

    /// Ordering key for ranking; unbounded sorts above every finite value.
    pub fn sort_key(&self) -> f64 {
        match self {
            Ratio::Finite(v) => *v,
            Ratio::Unbounded => f64::MAX,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{:.*}", f.precision().unwrap_or(2), v),
            Ratio::Unbounded => write!(f, "∞"),
        }
    }
}

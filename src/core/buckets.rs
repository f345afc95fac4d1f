use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};

pub const DEFAULT_R_EDGES: [f64; 7] = [-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
pub const DEFAULT_PROFIT_EDGES: [f64; 7] = [-20000.0, -10000.0, -5000.0, 0.0, 5000.0, 10000.0, 20000.0];

/// Upper bounds (exclusive, minutes) of the holding-time buckets; the last bucket is open.
const HOLDING_EDGES: [i64; 4] = [30, 120, 480, 1440];
pub const HOLDING_LABELS: [&str; 5] = ["0-30m", "30m-2h", "2h-8h", "8h-1d", "1d+"];

pub fn holding_bucket(minutes: i64) -> usize {
    HOLDING_EDGES.partition_point(|edge| *edge <= minutes)
}

/// Interior edges partitioning the real line into half-open buckets
/// `(-inf, e0), [e0, e1), ..., [en, +inf)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketEdges {
    edges: Vec<f64>,
}

impl BucketEdges {
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        let finite = edges.iter().all(|e| e.is_finite());
        let increasing = edges.windows(2).all(|w| w[0] < w[1]);
        if !finite || !increasing {
            return Err(JournalError::InvalidEdges(edges));
        }
        Ok(Self { edges })
    }

    /// Comma separated list, e.g. `"-2,-1,0,1,2"`.
    pub fn parse_list(s: &str) -> Result<Self> {
        let edges = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| JournalError::UnparseableEdges(s.to_string()))?;
        Self::new(edges)
    }

    pub fn r_multiple_default() -> Self {
        Self {
            edges: DEFAULT_R_EDGES.to_vec(),
        }
    }

    pub fn profit_default() -> Self {
        Self {
            edges: DEFAULT_PROFIT_EDGES.to_vec(),
        }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn bucket_count(&self) -> usize {
        self.edges.len() + 1
    }

    pub fn index_of(&self, value: f64) -> usize {
        self.edges.partition_point(|edge| *edge <= value)
    }

    pub fn bounds(&self, index: usize) -> (f64, f64) {
        let lo = if index == 0 {
            f64::NEG_INFINITY
        } else {
            self.edges[index - 1]
        };
        let hi = self.edges.get(index).copied().unwrap_or(f64::INFINITY);
        (lo, hi)
    }

    pub fn labels(&self, unit: &str) -> Vec<String> {
        (0..self.bucket_count())
            .map(|i| match self.bounds(i) {
                (lo, hi) if lo.is_infinite() && hi.is_infinite() => "all".to_string(),
                (lo, hi) if lo.is_infinite() => format!("< {}{}", hi, unit),
                (lo, hi) if hi.is_infinite() => format!(">= {}{}", lo, unit),
                (lo, hi) => format!("{}{} to {}{}", lo, unit, hi, unit),
            })
            .collect()
    }
}

use serde::{Deserialize, Serialize};

use crate::engine::types::TimedValue;

/// Intermediate state of the mean aggregate: a running mean and the number of
/// points folded into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanState {
    pub count: u64,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadState {
    pub min: f64,
    pub max: f64,
}

impl SpreadState {
    pub fn merge(&mut self, other: &SpreadState) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn spread(&self) -> f64 {
        self.max - self.min
    }
}

/// Partial aggregate produced by one map invocation for one (shard, bucket).
///
/// The variant is fixed by the aggregate chosen at dispatch. Absence of data is
/// carried as `Option::None` around a `Partial`, never as a zero-valued variant.
/// Serialization is untagged: the wire carries the bare payload and the
/// receiving side picks the decoder from the aggregate name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Partial {
    /// count, sum, min, max
    Scalar(f64),
    Mean(MeanState),
    Spread(SpreadState),
    /// stddev, median and the percentile echo
    Values(Vec<f64>),
    /// first, last
    Extremum(TimedValue),
    Raw(Vec<TimedValue>),
}

impl Partial {
    pub fn kind(&self) -> &'static str {
        match self {
            Partial::Scalar(_) => "scalar",
            Partial::Mean(_) => "mean",
            Partial::Spread(_) => "spread",
            Partial::Values(_) => "values",
            Partial::Extremum(_) => "extremum",
            Partial::Raw(_) => "raw",
        }
    }

    /// First NaN or infinite float carried by the partial, if any.
    pub fn first_non_finite(&self) -> Option<f64> {
        let non_finite = |v: &f64| !v.is_finite();
        match self {
            Partial::Scalar(v) => Some(*v).filter(non_finite),
            Partial::Mean(state) => Some(state.mean).filter(non_finite),
            Partial::Spread(range) => [range.min, range.max].into_iter().find(non_finite),
            Partial::Values(values) => values.iter().copied().find(non_finite),
            Partial::Extremum(point) => point.value.as_f64().filter(non_finite),
            Partial::Raw(rows) => rows
                .iter()
                .filter_map(|row| row.value.as_f64())
                .find(non_finite),
        }
    }
}

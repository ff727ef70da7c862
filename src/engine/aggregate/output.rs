use serde::Serialize;

use crate::engine::types::{PointValue, TimedValue};

/// Final answer for one bucket, produced only by a combiner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggOutput {
    Number(f64),
    /// first / last carry the original point value
    Value(PointValue),
    /// raw passthrough rows, timestamp ascending
    Points(Vec<TimedValue>),
}

impl AggOutput {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AggOutput::Number(v) => Some(*v),
            AggOutput::Value(v) => v.as_f64(),
            AggOutput::Points(_) => None,
        }
    }

    pub fn as_points(&self) -> Option<&[TimedValue]> {
        match self {
            AggOutput::Points(p) => Some(p),
            _ => None,
        }
    }
}

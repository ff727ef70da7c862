use bucket_agg::engine::aggregate::AggOutput;
use bucket_agg::engine::types::TimedValue;
use serde::Deserialize;
use tracing::debug;

const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    /// Numeric answer, compared within a small tolerance
    Number(f64),
    /// Exact point value, for first/last
    Value(serde_json::Value),
    Points(Vec<TimedValue>),
    Absent,
    /// Dispatch rejected the call; the message must contain this text
    InvalidCall(String),
    /// The map phase failed on at least one shard
    MapError,
}

impl Expectation {
    pub fn matches_output(&self, actual: Option<&AggOutput>) -> bool {
        debug!("Matching {:?} against {:?}", self, actual);
        match (self, actual) {
            (Expectation::Absent, None) => true,
            (Expectation::Number(expected), Some(out)) => out
                .as_f64()
                .is_some_and(|v| (v - expected).abs() <= TOLERANCE),
            (Expectation::Value(expected), Some(AggOutput::Value(v))) => {
                serde_json::to_value(v).is_ok_and(|v| &v == expected)
            }
            (Expectation::Points(expected), Some(out)) => out.as_points() == Some(expected.as_slice()),
            _ => false,
        }
    }

    pub fn matches_invalid_call(&self, message: &str) -> bool {
        match self {
            Expectation::InvalidCall(expected) => message.contains(expected.as_str()),
            _ => false,
        }
    }
}

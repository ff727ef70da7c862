use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub type SeriesId = u64;
pub type Timestamp = i64;

/// Value carried by a point. Numeric aggregates only accept `Float`;
/// count, first, last and raw passthrough carry either variant unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Float(f64),
    Opaque(JsonValue),
}

impl PointValue {
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PointValue::Float(v) => Some(*v),
            PointValue::Opaque(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PointValue::Float(_) => "Float",
            PointValue::Opaque(JsonValue::Null) => "Null",
            PointValue::Opaque(JsonValue::Bool(_)) => "Boolean",
            PointValue::Opaque(JsonValue::Number(_)) => "Number",
            PointValue::Opaque(JsonValue::String(_)) => "String",
            PointValue::Opaque(JsonValue::Array(_)) => "Array",
            PointValue::Opaque(JsonValue::Object(_)) => "Object",
        }
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointValue::Float(v) => write!(f, "{v}"),
            PointValue::Opaque(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for PointValue {
    fn from(value: f64) -> Self {
        PointValue::Float(value)
    }
}

impl From<JsonValue> for PointValue {
    fn from(value: JsonValue) -> Self {
        PointValue::Opaque(value)
    }
}

impl From<&str> for PointValue {
    fn from(value: &str) -> Self {
        PointValue::Opaque(JsonValue::String(value.to_string()))
    }
}

/// A single sample handed out by a point source for one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub series_id: SeriesId,
    pub timestamp: Timestamp,
    pub value: PointValue,
}

impl Point {
    pub fn new(series_id: SeriesId, timestamp: Timestamp, value: impl Into<PointValue>) -> Self {
        Self {
            series_id,
            timestamp,
            value: value.into(),
        }
    }
}

/// `{timestamp, value}` pair used by first/last partials and raw passthrough rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedValue {
    pub timestamp: Timestamp,
    pub value: PointValue,
}

impl TimedValue {
    pub fn new(timestamp: Timestamp, value: impl Into<PointValue>) -> Self {
        Self {
            timestamp,
            value: value.into(),
        }
    }
}

impl From<Point> for TimedValue {
    fn from(point: Point) -> Self {
        Self {
            timestamp: point.timestamp,
            value: point.value,
        }
    }
}

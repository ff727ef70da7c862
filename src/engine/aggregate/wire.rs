//! Byte-level contract for shipping partials between nodes.
//!
//! The payload is the partial's bare shape (`3.0`, `{"count":2,"mean":4.0}`,
//! `[1.0,2.0]`, ...), with absence encoded as `null` / msgpack nil. Each
//! aggregate registers the decoder for its own shape.

use std::fmt;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::engine::aggregate::partial::{MeanState, Partial, SpreadState};
use crate::engine::errors::{DecodeError, EncodeError};
use crate::engine::types::TimedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum WireFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "msgpack")]
    MessagePack,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::MessagePack => "msgpack",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature shared by every per-shape decoder.
pub type DecodeFn = fn(&str, &[u8], WireFormat) -> Result<Option<Partial>, DecodeError>;

pub fn encode(
    aggregate: &str,
    partial: Option<&Partial>,
    format: WireFormat,
) -> Result<Vec<u8>, EncodeError> {
    let result = match format {
        WireFormat::Json => {
            // serde_json writes NaN and infinities as `null`, which reads back as absent
            if let Some(value) = partial.and_then(Partial::first_non_finite) {
                return Err(EncodeError::NonFinite {
                    aggregate: aggregate.to_string(),
                    format,
                    value,
                });
            }
            serde_json::to_vec(&partial).map_err(|e| e.to_string())
        }
        WireFormat::MessagePack => rmp_serde::to_vec_named(&partial).map_err(|e| e.to_string()),
    };
    result.map_err(|reason| EncodeError::Serialize {
        aggregate: aggregate.to_string(),
        format,
        reason,
    })
}

fn decode_as<T: DeserializeOwned>(
    aggregate: &str,
    bytes: &[u8],
    format: WireFormat,
) -> Result<Option<T>, DecodeError> {
    let result = match format {
        WireFormat::Json => serde_json::from_slice::<Option<T>>(bytes).map_err(|e| e.to_string()),
        WireFormat::MessagePack => {
            rmp_serde::from_slice::<Option<T>>(bytes).map_err(|e| e.to_string())
        }
    };
    result.map_err(|reason| DecodeError::Malformed {
        aggregate: aggregate.to_string(),
        format,
        reason,
    })
}

pub fn decode_scalar(
    aggregate: &str,
    bytes: &[u8],
    format: WireFormat,
) -> Result<Option<Partial>, DecodeError> {
    Ok(decode_as::<f64>(aggregate, bytes, format)?.map(Partial::Scalar))
}

pub fn decode_mean(
    aggregate: &str,
    bytes: &[u8],
    format: WireFormat,
) -> Result<Option<Partial>, DecodeError> {
    Ok(decode_as::<MeanState>(aggregate, bytes, format)?.map(Partial::Mean))
}

pub fn decode_spread(
    aggregate: &str,
    bytes: &[u8],
    format: WireFormat,
) -> Result<Option<Partial>, DecodeError> {
    Ok(decode_as::<SpreadState>(aggregate, bytes, format)?.map(Partial::Spread))
}

pub fn decode_values(
    aggregate: &str,
    bytes: &[u8],
    format: WireFormat,
) -> Result<Option<Partial>, DecodeError> {
    Ok(decode_as::<Vec<f64>>(aggregate, bytes, format)?.map(Partial::Values))
}

pub fn decode_extremum(
    aggregate: &str,
    bytes: &[u8],
    format: WireFormat,
) -> Result<Option<Partial>, DecodeError> {
    Ok(decode_as::<TimedValue>(aggregate, bytes, format)?.map(Partial::Extremum))
}

pub fn decode_raw(
    aggregate: &str,
    bytes: &[u8],
    format: WireFormat,
) -> Result<Option<Partial>, DecodeError> {
    Ok(decode_as::<Vec<TimedValue>>(aggregate, bytes, format)?.map(Partial::Raw))
}

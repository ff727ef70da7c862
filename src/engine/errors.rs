use thiserror::Error;
use tracing::{debug, error, warn};

use crate::engine::aggregate::wire::WireFormat;
use crate::engine::types::{SeriesId, Timestamp};

/// Rejected aggregate calls. Raised at dispatch time, before any map work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCallError {
    #[error("function not found: {0:?}")]
    UnknownFunction(String),

    #[error("expected {expected} argument(s) for {name}(), got {got}")]
    ArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("expected field argument in {0}()")]
    NotFieldRef(String),

    #[error("expected float argument in {0}()")]
    NotNumberLiteral(String),

    #[error("{name}() rank must be a finite number within 0..=100, got {rank}")]
    RankOutOfRange { name: String, rank: f64 },
}

/// Wire payload could not be turned back into the expected partial shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed {format} payload for {aggregate}(): {reason}")]
    Malformed {
        aggregate: String,
        format: WireFormat,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to encode {aggregate}() partial as {format}: {reason}")]
    Serialize {
        aggregate: String,
        format: WireFormat,
        reason: String,
    },

    #[error("{aggregate}() partial holds non-finite {value}, which {format} cannot carry")]
    NonFinite {
        aggregate: String,
        format: WireFormat,
        value: f64,
    },
}

/// Type-contract violation during the map phase. Fatal to that invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error(
        "{aggregate}() expects numeric values, series {series_id} at {timestamp} carried {found}"
    )]
    NonNumeric {
        aggregate: String,
        series_id: SeriesId,
        timestamp: Timestamp,
        found: &'static str,
    },
}

/// A combiner was handed a partial whose shape belongs to another aggregate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReduceError {
    #[error("{aggregate}() cannot combine a {found} partial")]
    UnexpectedPartial {
        aggregate: String,
        found: &'static str,
    },

    #[error("{aggregate}() is missing its {what} argument")]
    MissingArgument {
        aggregate: String,
        what: &'static str,
    },
}

/// Failures tied to one shard's contribution for one bucket.
#[derive(Debug, Error)]
pub enum ShardError {
    #[error("shard {shard_id} bucket {bucket}: map failed: {source}")]
    Map {
        shard_id: usize,
        bucket: Timestamp,
        #[source]
        source: MapError,
    },

    #[error("shard {shard_id} bucket {bucket}: {source}")]
    Encode {
        shard_id: usize,
        bucket: Timestamp,
        #[source]
        source: EncodeError,
    },

    #[error("shard {shard_id} bucket {bucket}: {source}")]
    Decode {
        shard_id: usize,
        bucket: Timestamp,
        #[source]
        source: DecodeError,
    },

    #[error("shard {shard_id} answered for bucket {got} while merging bucket {bucket}")]
    BucketMismatch {
        shard_id: usize,
        bucket: Timestamp,
        got: Timestamp,
    },

    #[error("shard {shard_id} bucket {bucket}: map task aborted: {reason}")]
    Aborted {
        shard_id: usize,
        bucket: Timestamp,
        reason: String,
    },

    #[error("bucket {bucket}: reduce failed: {source}")]
    Reduce {
        bucket: Timestamp,
        #[source]
        source: ReduceError,
    },
}

impl ShardError {
    pub fn shard_id(&self) -> Option<usize> {
        match self {
            ShardError::Map { shard_id, .. }
            | ShardError::Encode { shard_id, .. }
            | ShardError::Decode { shard_id, .. }
            | ShardError::BucketMismatch { shard_id, .. }
            | ShardError::Aborted { shard_id, .. } => Some(*shard_id),
            ShardError::Reduce { .. } => None,
        }
    }

    pub fn log_error(&self) {
        match self {
            ShardError::Map { shard_id, bucket, source } => {
                error!(target: "bucket_agg::map", shard_id, bucket, "Map phase failed: {}", source);
                debug!(target: "bucket_agg::map", "Map error details: {:?}", source);
            }
            ShardError::Encode { shard_id, bucket, source } => {
                error!(target: "bucket_agg::map", shard_id, bucket, "Encoding partial failed: {}", source);
            }
            ShardError::Decode { shard_id, bucket, source } => {
                warn!(target: "bucket_agg::merge", shard_id, bucket, "Shard response rejected: {}", source);
                debug!(target: "bucket_agg::merge", "Decode error details: {:?}", source);
            }
            ShardError::BucketMismatch { shard_id, bucket, got } => {
                warn!(target: "bucket_agg::merge", shard_id, bucket, got, "Shard response belongs to another bucket");
            }
            ShardError::Aborted { shard_id, bucket, reason } => {
                error!(target: "bucket_agg::map", shard_id, bucket, "Map task aborted: {}", reason);
            }
            ShardError::Reduce { bucket, source } => {
                error!(target: "bucket_agg::merge", bucket, "Reduce failed: {}", source);
            }
        }
    }
}

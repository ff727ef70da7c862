use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::engine::aggregate::registry::ResolvedAggregate;
use crate::engine::aggregate::wire::WireFormat;
use crate::engine::errors::ShardError;
use crate::engine::source::PointSource;
use crate::engine::types::Timestamp;
use crate::shared::config::{AggregateConfig, CONFIG};

/// Encoded partial produced by one shard for one bucket, ready to ship to the
/// coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardResponse {
    pub shard_id: usize,
    pub bucket: Timestamp,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPhaseOptions {
    pub format: WireFormat,
    pub concurrency: usize,
}

impl MapPhaseOptions {
    pub fn from_config(config: &AggregateConfig) -> Self {
        Self {
            format: config.wire_format,
            concurrency: config.map_concurrency.max(1),
        }
    }
}

impl Default for MapPhaseOptions {
    fn default() -> Self {
        Self::from_config(&CONFIG.aggregate)
    }
}

/// Runs the map function over one shard's source and encodes the result.
pub fn map_shard(
    aggregate: &ResolvedAggregate,
    shard_id: usize,
    bucket: Timestamp,
    source: &mut dyn PointSource,
    format: WireFormat,
) -> Result<ShardResponse, ShardError> {
    let partial = aggregate
        .map(source)
        .map_err(|source| ShardError::Map {
            shard_id,
            bucket,
            source,
        })?;

    debug!(
        target: "bucket_agg::map",
        aggregate = aggregate.name(),
        shard_id,
        bucket,
        has_data = partial.is_some(),
        kind = partial.as_ref().map(|p| p.kind()).unwrap_or("absent"),
        "Shard map complete"
    );

    let payload = aggregate
        .encode(partial.as_ref(), format)
        .map_err(|source| ShardError::Encode {
            shard_id,
            bucket,
            source,
        })?;

    Ok(ShardResponse {
        shard_id,
        bucket,
        payload,
    })
}

/// Fans the map phase for `bucket` out over every shard's source.
///
/// Each source is drained on the blocking pool since storage cursors may block
/// on I/O. Shard ids are the positions in `sources`; results come back in the
/// same order, one per shard, so a failing shard never hides the others.
pub async fn run_map_phase<S>(
    aggregate: Arc<ResolvedAggregate>,
    bucket: Timestamp,
    sources: Vec<S>,
    options: MapPhaseOptions,
) -> Vec<Result<ShardResponse, ShardError>>
where
    S: PointSource + Send + 'static,
{
    info!(
        target: "bucket_agg::map",
        aggregate = aggregate.name(),
        bucket,
        shards = sources.len(),
        concurrency = options.concurrency,
        format = %options.format,
        "Starting map phase"
    );

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut handles = Vec::with_capacity(sources.len());

    for (shard_id, mut source) in sources.into_iter().enumerate() {
        let aggregate = Arc::clone(&aggregate);
        let semaphore = Arc::clone(&semaphore);
        let format = options.format;

        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ShardError::Aborted {
                    shard_id,
                    bucket,
                    reason: e.to_string(),
                })?;

            tokio::task::spawn_blocking(move || {
                map_shard(&aggregate, shard_id, bucket, &mut source, format)
            })
            .await
            .unwrap_or_else(|e| {
                Err(ShardError::Aborted {
                    shard_id,
                    bucket,
                    reason: e.to_string(),
                })
            })
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (shard_id, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap_or_else(|e| {
            Err(ShardError::Aborted {
                shard_id,
                bucket,
                reason: e.to_string(),
            })
        });
        if let Err(e) = &result {
            e.log_error();
        }
        results.push(result);
    }
    results
}

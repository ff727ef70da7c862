use std::sync::Arc;

use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::engine::aggregate::output::AggOutput;
use crate::engine::aggregate::partial::Partial;
use crate::engine::aggregate::registry::ResolvedAggregate;
use crate::engine::aggregate::wire::WireFormat;
use crate::engine::errors::ShardError;
use crate::engine::shard::mapper::ShardResponse;
use crate::engine::types::Timestamp;
use crate::shared::config::{AggregateConfig, CONFIG, DecodeFailurePolicy};

/// Combined answer for one bucket plus the shards that could not contribute.
#[derive(Debug)]
pub struct BucketOutcome {
    pub bucket: Timestamp,
    pub result: Option<AggOutput>,
    pub contributing_shards: usize,
    pub failed_shards: Vec<ShardError>,
}

impl BucketOutcome {
    /// True when at least one shard was left out of the answer.
    pub fn is_degraded(&self) -> bool {
        !self.failed_shards.is_empty()
    }
}

/// Coordinator side of the protocol: decodes every shard's payload for a
/// bucket and folds them with the aggregate's combiner.
///
/// Callers invoke it once all expected shard responses for the bucket are in,
/// including the ones that encode "no data". Responses stamped with another
/// bucket count as failed shards; completeness is not checked.
pub struct BucketMerger {
    aggregate: Arc<ResolvedAggregate>,
    format: WireFormat,
    policy: DecodeFailurePolicy,
}

impl BucketMerger {
    pub fn new(aggregate: Arc<ResolvedAggregate>) -> Self {
        Self::from_config(aggregate, &CONFIG.aggregate)
    }

    pub fn from_config(aggregate: Arc<ResolvedAggregate>, config: &AggregateConfig) -> Self {
        Self {
            aggregate,
            format: config.wire_format,
            policy: config.on_decode_failure,
        }
    }

    pub fn with_format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_policy(mut self, policy: DecodeFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn merge(
        &self,
        bucket: Timestamp,
        responses: Vec<ShardResponse>,
    ) -> Result<BucketOutcome, ShardError> {
        let mut rng = StdRng::from_entropy();
        self.merge_results_with_rng(bucket, responses.into_iter().map(Ok).collect(), &mut rng)
    }

    pub fn merge_with_rng(
        &self,
        bucket: Timestamp,
        responses: Vec<ShardResponse>,
        rng: &mut dyn RngCore,
    ) -> Result<BucketOutcome, ShardError> {
        self.merge_results_with_rng(bucket, responses.into_iter().map(Ok).collect(), rng)
    }

    /// Like [`BucketMerger::merge`], but also takes shards whose map phase
    /// already failed; those count as failures under the same policy.
    pub fn merge_results(
        &self,
        bucket: Timestamp,
        results: Vec<Result<ShardResponse, ShardError>>,
    ) -> Result<BucketOutcome, ShardError> {
        let mut rng = StdRng::from_entropy();
        self.merge_results_with_rng(bucket, results, &mut rng)
    }

    pub fn merge_results_with_rng(
        &self,
        bucket: Timestamp,
        results: Vec<Result<ShardResponse, ShardError>>,
        rng: &mut dyn RngCore,
    ) -> Result<BucketOutcome, ShardError> {
        let mut partials: Vec<Option<Partial>> = Vec::with_capacity(results.len());
        let mut failed_shards = Vec::new();

        for result in results {
            let decoded = result.and_then(|response| {
                if response.bucket != bucket {
                    return Err(ShardError::BucketMismatch {
                        shard_id: response.shard_id,
                        bucket,
                        got: response.bucket,
                    });
                }
                self.aggregate
                    .decode(&response.payload, self.format)
                    .map_err(|source| ShardError::Decode {
                        shard_id: response.shard_id,
                        bucket,
                        source,
                    })
            });
            match decoded {
                Ok(partial) => partials.push(partial),
                Err(err) => {
                    err.log_error();
                    if self.policy == DecodeFailurePolicy::FailBucket {
                        return Err(err);
                    }
                    failed_shards.push(err);
                }
            }
        }

        let contributing_shards = partials.len();
        debug!(
            target: "bucket_agg::merge",
            aggregate = self.aggregate.name(),
            bucket,
            contributing_shards,
            failed = failed_shards.len(),
            "Combining shard partials"
        );

        let result = self
            .aggregate
            .reduce_with_rng(partials, rng)
            .map_err(|source| ShardError::Reduce { bucket, source })?;

        if !failed_shards.is_empty() {
            info!(
                target: "bucket_agg::merge",
                aggregate = self.aggregate.name(),
                bucket,
                failed = failed_shards.len(),
                "Bucket answered from a partial set of shards"
            );
        }

        Ok(BucketOutcome {
            bucket,
            result,
            contributing_shards,
            failed_shards,
        })
    }
}

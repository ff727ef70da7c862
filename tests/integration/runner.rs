use std::sync::Arc;

use bucket_agg::engine::aggregate::resolve;
use bucket_agg::engine::shard::{BucketMerger, MapPhaseOptions, run_map_phase};
use bucket_agg::engine::source::VecSource;
use bucket_agg::engine::types::Point;
use bucket_agg::shared::config::{AggregateConfig, DecodeFailurePolicy};
use tracing::{debug, info};

use crate::integration::matcher::Expectation;
use crate::integration::scenarios::TestScenario;

fn sources_for(scenario: &TestScenario) -> Vec<VecSource> {
    scenario
        .shards
        .iter()
        .map(|pairs| {
            VecSource::new(
                pairs
                    .iter()
                    .map(|(ts, v)| Point::new(1, *ts, v.clone()))
                    .collect(),
            )
        })
        .collect()
}

pub async fn run_scenario(scenario: &TestScenario) {
    info!("▶ Running scenario: {}", scenario.name);

    let call = scenario.call.as_ref().map(|c| c.to_call());
    let aggregate = match resolve(call.as_ref()) {
        Ok(aggregate) => Arc::new(aggregate),
        Err(e) => {
            assert!(
                scenario.expect.matches_invalid_call(&e.to_string()),
                "[{}] unexpected dispatch error: {}",
                scenario.name,
                e
            );
            return;
        }
    };

    let config = AggregateConfig {
        wire_format: scenario.format,
        on_decode_failure: DecodeFailurePolicy::FailBucket,
        ..AggregateConfig::default()
    };
    let results = run_map_phase(
        Arc::clone(&aggregate),
        scenario.bucket,
        sources_for(scenario),
        MapPhaseOptions::from_config(&config),
    )
    .await;

    if results.iter().any(|r| r.is_err()) {
        assert!(
            matches!(scenario.expect, Expectation::MapError),
            "[{}] map phase failed: {:?}",
            scenario.name,
            results.iter().filter_map(|r| r.as_ref().err()).collect::<Vec<_>>()
        );
        return;
    }

    let outcome = BucketMerger::from_config(aggregate, &config)
        .merge_results(scenario.bucket, results)
        .unwrap_or_else(|e| panic!("[{}] merge failed: {}", scenario.name, e));
    debug!("Scenario {} produced {:?}", scenario.name, outcome.result);

    assert!(
        scenario.expect.matches_output(outcome.result.as_ref()),
        "[{}] expected {:?}, got {:?}",
        scenario.name,
        scenario.expect,
        outcome.result
    );
}

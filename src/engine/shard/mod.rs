pub mod mapper;
pub mod merger;

pub use mapper::{MapPhaseOptions, ShardResponse, map_shard, run_map_phase};
pub use merger::{BucketMerger, BucketOutcome};

use serde::Deserialize;

use crate::engine::aggregate::wire::WireFormat;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub aggregate: AggregateConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFailurePolicy {
    /// Skip shards whose payload does not decode and answer from the rest
    Degrade,
    /// Any undecodable shard fails the whole bucket
    FailBucket,
}

impl Default for DecodeFailurePolicy {
    fn default() -> Self {
        DecodeFailurePolicy::Degrade
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub wire_format: WireFormat,
    /// Series id the storage layer uses to mark end-of-stream
    pub end_of_stream_series_id: u64,
    pub on_decode_failure: DecodeFailurePolicy,
    /// Max shard map tasks running at once for a single bucket
    pub map_concurrency: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            wire_format: WireFormat::Json,
            end_of_stream_series_id: 0,
            on_decode_failure: DecodeFailurePolicy::Degrade,
            map_concurrency: default_map_concurrency(),
        }
    }
}

fn default_map_concurrency() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            stdout_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("BUCKET_AGG_CONFIG").unwrap_or_else(|_| "config".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}

use bucket_agg::engine::aggregate::{AggregateCall, CallArg, WireFormat};
use bucket_agg::engine::types::{PointValue, Timestamp};
use serde::Deserialize;
use std::fs;

use crate::integration::matcher::Expectation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioArg {
    Field(String),
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct ScenarioCall {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ScenarioArg>,
}

impl ScenarioCall {
    pub fn to_call(&self) -> AggregateCall {
        let args = self
            .args
            .iter()
            .map(|arg| match arg {
                ScenarioArg::Field(f) => CallArg::FieldRef(f.clone()),
                ScenarioArg::Number(n) => CallArg::NumberLiteral(*n),
                ScenarioArg::Text(s) => CallArg::StringLiteral(s.clone()),
            })
            .collect();
        AggregateCall::new(self.name.clone(), args)
    }
}

#[derive(Debug, Deserialize)]
pub struct TestScenario {
    pub name: String,
    /// Omitted for raw passthrough
    pub call: Option<ScenarioCall>,
    #[serde(default = "default_format")]
    pub format: WireFormat,
    #[serde(default)]
    pub bucket: Timestamp,
    /// One list of `[timestamp, value]` pairs per shard
    #[serde(default)]
    pub shards: Vec<Vec<(Timestamp, PointValue)>>,
    pub expect: Expectation,
}

fn default_format() -> WireFormat {
    WireFormat::Json
}

pub fn load_scenarios_from_json(path: &str) -> Vec<TestScenario> {
    let content = fs::read_to_string(path).expect("Failed to read scenario file");
    serde_json::from_str(&content).expect("Invalid JSON format")
}

//! Client-side protocol settings

use std::path::Path;

use serde::Deserialize;
use wirelog_common::Result;

use crate::messages::IsolationLevel;
use crate::release::KafkaRelease;

/// Settings that decide which versions are negotiated and how requests are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Release of the brokers being talked to.
    pub broker_release: KafkaRelease,
    pub fetch: FetchConfig,
}

impl ProtocolConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_wait_ms: u32,
    pub min_bytes: i32,
    pub max_bytes: i32,
    pub isolation: IsolationLevel,
    pub rack_id: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: 500,
            min_bytes: 1,
            max_bytes: 100 * 1024 * 1024,
            isolation: IsolationLevel::ReadUncommitted,
            rack_id: String::new(),
        }
    }
}

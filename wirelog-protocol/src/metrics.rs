//! Optional activity counters fed during encoding
//!
//! Metrics never influence encoded bytes. Encoding works the same with
//! [`NoopRegistry`] as with a live registry.

use std::collections::BTreeMap;

use dashmap::DashMap;

/// Meter marked once per topic each time a fetch request is encoded.
pub const FETCH_RATE_METER: &str = "consumer-fetch-rate";

/// Sink for per-topic meters.
pub trait MetricRegistry: Send + Sync {
    fn mark_topic_meter(&self, meter: &str, topic: &str, count: u64);
}

/// Registry that drops every mark.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRegistry;

impl MetricRegistry for NoopRegistry {
    fn mark_topic_meter(&self, _meter: &str, _topic: &str, _count: u64) {}
}

/// In-memory counters keyed by `<meter>-for-topic-<topic>`.
#[derive(Debug, Default)]
pub struct MeterRegistry {
    meters: DashMap<String, u64>,
}

pub fn topic_meter_name(meter: &str, topic: &str) -> String {
    format!("{meter}-for-topic-{topic}")
}

impl MeterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, meter: &str, topic: &str) -> u64 {
        self.meters
            .get(&topic_meter_name(meter, topic))
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.meters
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

impl MetricRegistry for MeterRegistry {
    fn mark_topic_meter(&self, meter: &str, topic: &str, count: u64) {
        *self
            .meters
            .entry(topic_meter_name(meter, topic))
            .or_insert(0) += count;
    }
}

//! Versioned codec for the Kafka wire protocol.
//!
//! Every message body implements [`ProtocolBody`]: it knows its API key, the
//! versions it supports, the header variant that frames it and the oldest
//! broker release that understands each version. Encoding and decoding are
//! pure functions of the value, the buffer and the negotiated version.

pub mod api_keys;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error_codes;
pub mod messages;
pub mod metrics;
pub mod primitives;
pub mod release;

pub use api_keys::ApiKey;
pub use catalog::{RequestBody, ResponseBody};
pub use codec::*;
pub use config::{FetchConfig, ProtocolConfig};
pub use error_codes::{ErrorCode, TopicError};
pub use messages::*;
pub use metrics::{MeterRegistry, MetricRegistry, NoopRegistry};
pub use release::KafkaRelease;
pub use wirelog_common::{Error, Result};

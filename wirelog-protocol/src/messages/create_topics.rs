//! CreateTopics request and response (API key 19, versions 0-3)

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::{Buf, BufMut};
use wirelog_common::Result;

use super::{decode_millis, encode_millis};
use crate::api_keys::ApiKey;
use crate::codec::{
    Decodable, Encodable, ProtocolBody, ThrottleReporting, VersionedDecodable, VersionedEncodable,
};
use crate::error_codes::TopicError;
use crate::metrics::MetricRegistry;
use crate::primitives::{
    get_array_length, get_nullable_string, get_string, put_array_length, put_nullable_string,
    put_string,
};
use crate::release::KafkaRelease;

/// First request version with the validate-only flag.
pub const CREATE_TOPICS_VALIDATE_ONLY_VERSION: i16 = 1;
/// First response version that reports a throttle time.
pub const CREATE_TOPICS_THROTTLE_VERSION: i16 = 2;

fn create_topics_release(version: i16) -> KafkaRelease {
    match version {
        3 => KafkaRelease::V2_0_0_0,
        2 => KafkaRelease::V0_11_0_0,
        1 => KafkaRelease::V0_10_2_0,
        0 => KafkaRelease::V0_10_1_0,
        _ => KafkaRelease::V2_8_0_0,
    }
}

/// How a new topic should be laid out. Set `num_partitions` and
/// `replication_factor` to -1 when supplying an explicit `replica_assignment`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicDetail {
    pub num_partitions: i32,
    pub replication_factor: i16,
    /// Partition index to the brokers hosting its replicas.
    pub replica_assignment: BTreeMap<i32, Vec<i32>>,
    /// Topic configuration overrides; `None` values are sent as null.
    pub config_entries: BTreeMap<String, Option<String>>,
}

impl VersionedEncodable for TopicDetail {
    fn encode_versioned(&self, buf: &mut impl BufMut, _version: i16) -> Result<()> {
        self.num_partitions.encode(buf)?;
        self.replication_factor.encode(buf)?;

        put_array_length(buf, self.replica_assignment.len())?;
        for (partition, replicas) in &self.replica_assignment {
            partition.encode(buf)?;
            replicas.encode(buf)?;
        }

        put_array_length(buf, self.config_entries.len())?;
        for (name, value) in &self.config_entries {
            put_string(buf, name)?;
            put_nullable_string(buf, value.as_deref())?;
        }
        Ok(())
    }
}

impl VersionedDecodable for TopicDetail {
    fn decode_versioned(buf: &mut impl Buf, _version: i16) -> Result<Self> {
        let mut detail = Self {
            num_partitions: i32::decode(buf)?,
            replication_factor: i16::decode(buf)?,
            ..Default::default()
        };

        let assignments = get_array_length(buf)?.unwrap_or(0);
        for _ in 0..assignments {
            let partition = i32::decode(buf)?;
            let replicas = Vec::<i32>::decode(buf)?;
            detail.replica_assignment.insert(partition, replicas);
        }

        let configs = get_array_length(buf)?.unwrap_or(0);
        for _ in 0..configs {
            let name = get_string(buf)?;
            let value = get_nullable_string(buf)?;
            detail.config_entries.insert(name, value);
        }
        Ok(detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateTopicsRequest {
    pub version: i16,
    pub topic_details: BTreeMap<String, TopicDetail>,
    pub timeout: Duration,
    /// Ask the broker to validate without creating anything (v1+).
    pub validate_only: bool,
}

impl CreateTopicsRequest {
    /// Build a request at the newest version a broker running `release` accepts.
    pub fn new(
        release: KafkaRelease,
        topic_details: BTreeMap<String, TopicDetail>,
        timeout: Duration,
        validate_only: bool,
    ) -> Self {
        Self {
            version: Self::highest_version_for(release),
            topic_details,
            timeout,
            validate_only,
        }
    }
}

impl ProtocolBody for CreateTopicsRequest {
    const API_KEY: ApiKey = ApiKey::CreateTopics;
    const MAX_VERSION: i16 = 3;

    fn version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        1
    }

    fn release_for_version(version: i16) -> KafkaRelease {
        create_topics_release(version)
    }

    fn encode_body(&self, buf: &mut impl BufMut, _metrics: &dyn MetricRegistry) -> Result<()> {
        put_array_length(buf, self.topic_details.len())?;
        for (topic, detail) in &self.topic_details {
            put_string(buf, topic)?;
            detail.encode_versioned(buf, self.version)?;
        }
        encode_millis(self.timeout, buf)?;
        if self.version >= CREATE_TOPICS_VALIDATE_ONLY_VERSION {
            self.validate_only.encode(buf)?;
        }
        Ok(())
    }

    fn decode_body(buf: &mut impl Buf, version: i16) -> Result<Self> {
        let mut request = Self {
            version,
            ..Default::default()
        };
        let count = get_array_length(buf)?.unwrap_or(0);
        for _ in 0..count {
            let topic = get_string(buf)?;
            let detail = TopicDetail::decode_versioned(buf, version)?;
            request.topic_details.insert(topic, detail);
        }
        request.timeout = decode_millis(buf)?;
        if version >= CREATE_TOPICS_VALIDATE_ONLY_VERSION {
            request.validate_only = bool::decode(buf)?;
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateTopicsResponse {
    pub version: i16,
    /// Time the request was throttled for quota violations (v2+).
    pub throttle_time: Duration,
    pub topic_errors: BTreeMap<String, TopicError>,
}

impl ProtocolBody for CreateTopicsResponse {
    const API_KEY: ApiKey = ApiKey::CreateTopics;
    const MAX_VERSION: i16 = 3;

    fn version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        0
    }

    fn release_for_version(version: i16) -> KafkaRelease {
        create_topics_release(version)
    }

    fn encode_body(&self, buf: &mut impl BufMut, _metrics: &dyn MetricRegistry) -> Result<()> {
        if self.version >= CREATE_TOPICS_THROTTLE_VERSION {
            encode_millis(self.throttle_time, buf)?;
        }
        put_array_length(buf, self.topic_errors.len())?;
        for (topic, error) in &self.topic_errors {
            put_string(buf, topic)?;
            error.encode_versioned(buf, self.version)?;
        }
        Ok(())
    }

    fn decode_body(buf: &mut impl Buf, version: i16) -> Result<Self> {
        let mut response = Self {
            version,
            ..Default::default()
        };
        if version >= CREATE_TOPICS_THROTTLE_VERSION {
            response.throttle_time = decode_millis(buf)?;
        }
        let count = get_array_length(buf)?.unwrap_or(0);
        for _ in 0..count {
            let topic = get_string(buf)?;
            let error = TopicError::decode_versioned(buf, version)?;
            response.topic_errors.insert(topic, error);
        }
        Ok(response)
    }
}

impl ThrottleReporting for CreateTopicsResponse {
    fn throttle_time(&self) -> Duration {
        self.throttle_time
    }
}

//! Fetch Request (API key 1, versions 0-11)

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::{Buf, BufMut};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::Deserialize;
use tracing::trace;
use wirelog_common::{Error, Result};

use super::{decode_millis, encode_millis};
use crate::api_keys::ApiKey;
use crate::codec::{Decodable, Encodable, ProtocolBody, VersionedDecodable, VersionedEncodable};
use crate::config::ProtocolConfig;
use crate::metrics::{MetricRegistry, FETCH_RATE_METER};
use crate::primitives::{get_array_length, get_string, put_array_length, put_string};
use crate::release::KafkaRelease;

/// Replica id a consumer sends; real ids are only used between brokers.
pub const CONSUMER_REPLICA_ID: i32 = -1;

pub const FETCH_MAX_BYTES_VERSION: i16 = 3;
pub const FETCH_ISOLATION_LEVEL_VERSION: i16 = 4;
pub const FETCH_LOG_START_OFFSET_VERSION: i16 = 5;
/// Session id, session epoch and the forgotten-partitions list.
pub const FETCH_SESSION_VERSION: i16 = 7;
pub const FETCH_LEADER_EPOCH_VERSION: i16 = 9;
pub const FETCH_RACK_ID_VERSION: i16 = 11;

/// Visibility of transactional records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive, ToPrimitive, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(i8)]
pub enum IsolationLevel {
    /// Every record is visible, including those of open transactions.
    #[default]
    ReadUncommitted = 0,
    /// Only records below the last stable offset are returned.
    ReadCommitted = 1,
}

impl Encodable for IsolationLevel {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        (*self as i8).encode(buf)
    }
}

impl Decodable for IsolationLevel {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        let level = i8::decode(buf)?;
        <IsolationLevel as num_traits::FromPrimitive>::from_i8(level)
            .ok_or_else(|| Error::Protocol(format!("unknown isolation level: {level}")))
    }
}

/// What to fetch from a single partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchRequestBlock {
    /// Leader epoch as known to the client (v9+).
    pub current_leader_epoch: i32,
    pub fetch_offset: i64,
    /// Earliest offset of a follower replica (v5+); consumers send 0.
    pub log_start_offset: i64,
    pub max_bytes: i32,
}

impl VersionedEncodable for FetchRequestBlock {
    fn encode_versioned(&self, buf: &mut impl BufMut, version: i16) -> Result<()> {
        if version >= FETCH_LEADER_EPOCH_VERSION {
            self.current_leader_epoch.encode(buf)?;
        }
        self.fetch_offset.encode(buf)?;
        if version >= FETCH_LOG_START_OFFSET_VERSION {
            self.log_start_offset.encode(buf)?;
        }
        self.max_bytes.encode(buf)
    }
}

impl VersionedDecodable for FetchRequestBlock {
    fn decode_versioned(buf: &mut impl Buf, version: i16) -> Result<Self> {
        let mut block = Self::default();
        if version >= FETCH_LEADER_EPOCH_VERSION {
            block.current_leader_epoch = i32::decode(buf)?;
        }
        block.fetch_offset = i64::decode(buf)?;
        if version >= FETCH_LOG_START_OFFSET_VERSION {
            block.log_start_offset = i64::decode(buf)?;
        }
        block.max_bytes = i32::decode(buf)?;
        Ok(block)
    }
}

/// Topics and partitions are kept in sorted maps, so the same request
/// always encodes to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchRequest {
    pub version: i16,
    /// How long the broker may wait for `min_bytes` to accumulate.
    pub max_wait_time: Duration,
    pub min_bytes: i32,
    /// Response size limit (v3+).
    pub max_bytes: i32,
    /// v4+
    pub isolation: IsolationLevel,
    /// Incremental fetch session (v7+).
    pub session_id: i32,
    pub session_epoch: i32,
    blocks: BTreeMap<String, BTreeMap<i32, FetchRequestBlock>>,
    forgotten: BTreeMap<String, Vec<i32>>,
    /// Rack of the consumer, for fetching from the closest replica (v11+).
    pub rack_id: String,
}

impl FetchRequest {
    pub fn new(version: i16) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// An empty request at the newest version `release` supports.
    pub fn for_release(release: KafkaRelease) -> Self {
        Self::new(Self::highest_version_for(release))
    }

    /// An empty request carrying the configured fetch limits.
    pub fn from_config(config: &ProtocolConfig) -> Self {
        let fetch = &config.fetch;
        Self {
            max_wait_time: Duration::from_millis(fetch.max_wait_ms.into()),
            min_bytes: fetch.min_bytes,
            max_bytes: fetch.max_bytes,
            isolation: fetch.isolation,
            rack_id: fetch.rack_id.clone(),
            ..Self::for_release(config.broker_release)
        }
    }

    /// Fetch `partition` of `topic` from `fetch_offset`. The leader epoch is
    /// only kept when the request version can carry it.
    pub fn add_block(
        &mut self,
        topic: impl Into<String>,
        partition: i32,
        fetch_offset: i64,
        max_bytes: i32,
        leader_epoch: i32,
    ) {
        let current_leader_epoch = if self.version >= FETCH_LEADER_EPOCH_VERSION {
            leader_epoch
        } else {
            0
        };
        self.insert_block(
            topic,
            partition,
            FetchRequestBlock {
                current_leader_epoch,
                fetch_offset,
                log_start_offset: 0,
                max_bytes,
            },
        );
    }

    pub fn insert_block(&mut self, topic: impl Into<String>, partition: i32, block: FetchRequestBlock) {
        self.blocks
            .entry(topic.into())
            .or_default()
            .insert(partition, block);
    }

    /// Ask an incremental session to drop `partition` of `topic`.
    pub fn forget_partition(&mut self, topic: impl Into<String>, partition: i32) {
        self.forgotten.entry(topic.into()).or_default().push(partition);
    }

    pub fn blocks(&self) -> &BTreeMap<String, BTreeMap<i32, FetchRequestBlock>> {
        &self.blocks
    }

    pub fn block(&self, topic: &str, partition: i32) -> Option<&FetchRequestBlock> {
        self.blocks.get(topic)?.get(&partition)
    }

    pub fn forgotten(&self) -> &BTreeMap<String, Vec<i32>> {
        &self.forgotten
    }
}

impl ProtocolBody for FetchRequest {
    const API_KEY: ApiKey = ApiKey::Fetch;
    const MAX_VERSION: i16 = 11;

    fn version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        1
    }

    fn release_for_version(version: i16) -> KafkaRelease {
        match version {
            11 => KafkaRelease::V2_3_0_0,
            9 | 10 => KafkaRelease::V2_1_0_0,
            8 => KafkaRelease::V2_0_0_0,
            7 => KafkaRelease::V1_1_0_0,
            6 => KafkaRelease::V1_0_0_0,
            4 | 5 => KafkaRelease::V0_11_0_0,
            3 => KafkaRelease::V0_10_1_0,
            2 => KafkaRelease::V0_10_0_0,
            1 => KafkaRelease::V0_9_0_0,
            0 => KafkaRelease::V0_8_2_0,
            _ => KafkaRelease::V2_3_0_0,
        }
    }

    fn encode_body(&self, buf: &mut impl BufMut, metrics: &dyn MetricRegistry) -> Result<()> {
        let version = self.version;

        CONSUMER_REPLICA_ID.encode(buf)?;
        encode_millis(self.max_wait_time, buf)?;
        self.min_bytes.encode(buf)?;
        if version >= FETCH_MAX_BYTES_VERSION {
            self.max_bytes.encode(buf)?;
        }
        if version >= FETCH_ISOLATION_LEVEL_VERSION {
            self.isolation.encode(buf)?;
        }
        if version >= FETCH_SESSION_VERSION {
            self.session_id.encode(buf)?;
            self.session_epoch.encode(buf)?;
        }

        put_array_length(buf, self.blocks.len())?;
        for (topic, partitions) in &self.blocks {
            put_string(buf, topic)?;
            put_array_length(buf, partitions.len())?;
            for (partition, block) in partitions {
                partition.encode(buf)?;
                block.encode_versioned(buf, version)?;
            }
            metrics.mark_topic_meter(FETCH_RATE_METER, topic, 1);
        }

        if version >= FETCH_SESSION_VERSION {
            put_array_length(buf, self.forgotten.len())?;
            for (topic, partitions) in &self.forgotten {
                put_string(buf, topic)?;
                partitions.encode(buf)?;
            }
        }

        if version >= FETCH_RACK_ID_VERSION {
            put_string(buf, &self.rack_id)?;
        }

        trace!(version, topics = self.blocks.len(), "encoded fetch request");
        Ok(())
    }

    fn decode_body(buf: &mut impl Buf, version: i16) -> Result<Self> {
        let mut request = Self::new(version);

        // replica id, always -1 from clients
        i32::decode(buf)?;
        request.max_wait_time = decode_millis(buf)?;
        request.min_bytes = i32::decode(buf)?;
        if version >= FETCH_MAX_BYTES_VERSION {
            request.max_bytes = i32::decode(buf)?;
        }
        if version >= FETCH_ISOLATION_LEVEL_VERSION {
            request.isolation = IsolationLevel::decode(buf)?;
        }
        if version >= FETCH_SESSION_VERSION {
            request.session_id = i32::decode(buf)?;
            request.session_epoch = i32::decode(buf)?;
        }

        let topic_count = get_array_length(buf)?.unwrap_or(0);
        for _ in 0..topic_count {
            let topic = get_string(buf)?;
            let partition_count = get_array_length(buf)?.unwrap_or(0);
            let partitions = request.blocks.entry(topic).or_default();
            for _ in 0..partition_count {
                let partition = i32::decode(buf)?;
                let block = FetchRequestBlock::decode_versioned(buf, version)?;
                partitions.insert(partition, block);
            }
        }

        if version >= FETCH_SESSION_VERSION {
            let forgotten_count = get_array_length(buf)?.unwrap_or(0);
            for _ in 0..forgotten_count {
                let topic = get_string(buf)?;
                let partition_count = get_array_length(buf)?.ok_or(Error::MalformedLength {
                    what: "forgotten partitions",
                    length: -1,
                })?;
                let partitions = request.forgotten.entry(topic).or_default();
                for _ in 0..partition_count {
                    partitions.push(i32::decode(buf)?);
                }
            }
        }

        if version >= FETCH_RACK_ID_VERSION {
            request.rack_id = get_string(buf)?;
        }

        trace!(version, topics = request.blocks.len(), "decoded fetch request");
        Ok(request)
    }
}

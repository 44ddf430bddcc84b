//! DeleteTopics request and response (API key 20, versions 0-3)

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::{Buf, BufMut};
use wirelog_common::Result;

use super::{decode_millis, encode_millis};
use crate::api_keys::ApiKey;
use crate::codec::{Decodable, Encodable, ProtocolBody, ThrottleReporting};
use crate::error_codes::ErrorCode;
use crate::metrics::MetricRegistry;
use crate::primitives::{get_array_length, get_string, put_array_length, put_string};
use crate::release::KafkaRelease;

/// First response version that reports a throttle time.
pub const DELETE_TOPICS_THROTTLE_VERSION: i16 = 1;

fn delete_topics_release(version: i16) -> KafkaRelease {
    match version {
        3 => KafkaRelease::V2_1_0_0,
        2 => KafkaRelease::V2_0_0_0,
        1 => KafkaRelease::V0_11_0_0,
        0 => KafkaRelease::V0_10_1_0,
        _ => KafkaRelease::V2_2_0_0,
    }
}

/// The body has the same shape at every version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteTopicsRequest {
    pub version: i16,
    /// A null topic list decodes as empty and re-encodes with length 0.
    pub topics: Vec<String>,
    pub timeout: Duration,
}

impl DeleteTopicsRequest {
    /// Build a request at the newest version a broker running `release` accepts.
    pub fn new(release: KafkaRelease, topics: Vec<String>, timeout: Duration) -> Self {
        Self {
            version: Self::highest_version_for(release),
            topics,
            timeout,
        }
    }
}

impl ProtocolBody for DeleteTopicsRequest {
    const API_KEY: ApiKey = ApiKey::DeleteTopics;
    const MAX_VERSION: i16 = 3;

    fn version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        1
    }

    fn release_for_version(version: i16) -> KafkaRelease {
        delete_topics_release(version)
    }

    fn encode_body(&self, buf: &mut impl BufMut, _metrics: &dyn MetricRegistry) -> Result<()> {
        self.topics.encode(buf)?;
        encode_millis(self.timeout, buf)
    }

    fn decode_body(buf: &mut impl Buf, version: i16) -> Result<Self> {
        let topics = Vec::<String>::decode(buf)?;
        let timeout = decode_millis(buf)?;
        Ok(Self {
            version,
            topics,
            timeout,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteTopicsResponse {
    pub version: i16,
    /// v1+
    pub throttle_time: Duration,
    pub topic_error_codes: BTreeMap<String, ErrorCode>,
}

impl ProtocolBody for DeleteTopicsResponse {
    const API_KEY: ApiKey = ApiKey::DeleteTopics;
    const MAX_VERSION: i16 = 3;

    fn version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        0
    }

    fn release_for_version(version: i16) -> KafkaRelease {
        delete_topics_release(version)
    }

    fn encode_body(&self, buf: &mut impl BufMut, _metrics: &dyn MetricRegistry) -> Result<()> {
        if self.version >= DELETE_TOPICS_THROTTLE_VERSION {
            encode_millis(self.throttle_time, buf)?;
        }
        put_array_length(buf, self.topic_error_codes.len())?;
        for (topic, code) in &self.topic_error_codes {
            put_string(buf, topic)?;
            code.encode(buf)?;
        }
        Ok(())
    }

    fn decode_body(buf: &mut impl Buf, version: i16) -> Result<Self> {
        let mut response = Self {
            version,
            ..Default::default()
        };
        if version >= DELETE_TOPICS_THROTTLE_VERSION {
            response.throttle_time = decode_millis(buf)?;
        }
        let count = get_array_length(buf)?.unwrap_or(0);
        for _ in 0..count {
            let topic = get_string(buf)?;
            let code = ErrorCode::decode(buf)?;
            response.topic_error_codes.insert(topic, code);
        }
        Ok(response)
    }
}

impl ThrottleReporting for DeleteTopicsResponse {
    fn throttle_time(&self) -> Duration {
        self.throttle_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn request_layout() {
        let request = DeleteTopicsRequest {
            version: 0,
            topics: vec!["topic".to_string(), "other".to_string()],
            timeout: Duration::from_millis(100),
        };
        let mut buf = BytesMut::new();
        request.encode(&mut buf).unwrap();
        assert_eq!(
            buf.to_vec(),
            vec![
                0, 0, 0, 2, // two topics
                0, 5, b't', b'o', b'p', b'i', b'c', //
                0, 5, b'o', b't', b'h', b'e', b'r', //
                0, 0, 0, 100, // timeout
            ]
        );
    }

    #[test]
    fn request_shape_does_not_change_with_version() {
        let mut encoded = Vec::new();
        for version in 0..=3 {
            let request = DeleteTopicsRequest {
                version,
                topics: vec!["t".to_string()],
                timeout: Duration::from_secs(5),
            };
            let mut buf = BytesMut::new();
            request.encode(&mut buf).unwrap();
            let decoded = DeleteTopicsRequest::decode(&mut buf.clone().freeze(), version).unwrap();
            assert_eq!(decoded, request);
            encoded.push(buf);
        }
        assert!(encoded.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn non_positive_timeout_decodes() {
        let mut wire: &[u8] = &[0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff];
        let request = DeleteTopicsRequest::decode(&mut wire, 0).unwrap();
        assert_eq!(request.timeout, Duration::ZERO);
        assert!(request.topics.is_empty());
    }

    #[test]
    fn null_topic_list_reencodes_as_empty() {
        let mut wire: &[u8] = &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 100];
        let request = DeleteTopicsRequest::decode(&mut wire, 1).unwrap();
        assert!(request.topics.is_empty());

        let mut buf = BytesMut::new();
        request.encode(&mut buf).unwrap();
        assert_eq!(buf.to_vec(), vec![0, 0, 0, 0, 0, 0, 0, 100]);
    }

    #[test]
    fn new_picks_version_from_release() {
        let topics = vec!["a".to_string()];
        let timeout = Duration::from_secs(1);
        let pick = |release| DeleteTopicsRequest::new(release, topics.clone(), timeout).version;
        assert_eq!(pick(KafkaRelease::V0_10_1_0), 0);
        assert_eq!(pick(KafkaRelease::V0_11_0_0), 1);
        assert_eq!(pick(KafkaRelease::V1_1_0_0), 1);
        assert_eq!(pick(KafkaRelease::V2_0_0_0), 2);
        assert_eq!(pick(KafkaRelease::V2_1_0_0), 3);
        assert_eq!(pick(KafkaRelease::V2_8_0_0), 3);
    }

    #[test]
    fn request_contract() {
        let request = DeleteTopicsRequest::new(KafkaRelease::V2_0_0_0, vec![], Duration::ZERO);
        assert_eq!(request.api_key(), ApiKey::DeleteTopics);
        assert_eq!(request.header_version(), 1);
        assert_eq!(request.required_release(), KafkaRelease::V2_0_0_0);
        assert_eq!(DeleteTopicsRequest::release_for_version(4), KafkaRelease::V2_2_0_0);
    }

    #[test]
    fn response_throttle_time_is_gated() {
        let mut response = DeleteTopicsResponse {
            version: 0,
            throttle_time: Duration::from_millis(100),
            topic_error_codes: BTreeMap::from([
                ("a".to_string(), ErrorCode::None),
                ("b".to_string(), ErrorCode::UnknownTopicOrPartition),
            ]),
        };

        let mut v0 = BytesMut::new();
        response.encode(&mut v0).unwrap();
        let decoded = DeleteTopicsResponse::decode(&mut v0.clone().freeze(), 0).unwrap();
        assert_eq!(decoded.throttle_time, Duration::ZERO);
        assert_eq!(decoded.topic_error_codes, response.topic_error_codes);

        response.version = 1;
        let mut v1 = BytesMut::new();
        response.encode(&mut v1).unwrap();
        assert_eq!(v1.len(), v0.len() + 4);
        let decoded = DeleteTopicsResponse::decode(&mut v1.freeze(), 1).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.throttle_time(), Duration::from_millis(100));
    }
}

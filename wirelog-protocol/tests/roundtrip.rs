use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use bytes::BytesMut;
use wirelog_protocol::error_codes::TOPIC_ERROR_MESSAGE_VERSION;
use wirelog_protocol::messages::*;
use wirelog_protocol::{Error, ErrorCode, KafkaRelease, ProtocolBody, TopicError};

const ENTRY_COUNTS: [usize; 3] = [0, 1, 5];

fn encode<T: ProtocolBody>(body: &T) -> Result<BytesMut> {
    let mut buf = BytesMut::new();
    body.encode(&mut buf)?;
    Ok(buf)
}

/// Encode, decode at the same version and compare.
fn assert_round_trip<T>(body: &T) -> Result<BytesMut>
where
    T: ProtocolBody + PartialEq + std::fmt::Debug,
{
    let buf = encode(body)?;
    let decoded = T::decode(&mut buf.clone().freeze(), body.version())?;
    assert_eq!(&decoded, body, "version {}", body.version());
    Ok(buf)
}

/// Every strict prefix of a valid encoding must fail as an underrun.
fn assert_truncations_underrun<T: ProtocolBody>(wire: &[u8], version: i16) {
    for len in 0..wire.len() {
        let mut truncated = &wire[..len];
        match T::decode(&mut truncated, version) {
            Err(err) => assert!(
                err.is_underrun(),
                "version {version}, {len} of {} bytes: {err}",
                wire.len()
            ),
            Ok(_) => panic!("version {version}: decoded from {len} of {} bytes", wire.len()),
        }
    }
}

fn assert_version_gate<T: ProtocolBody>(version: i16) {
    let mut wire: &[u8] = &[0; 64];
    let err = T::decode(&mut wire, version).err();
    assert!(
        matches!(err, Some(Error::InvalidVersion { version: v, .. }) if v == version),
        "version {version} was not rejected"
    );
    assert_eq!(wire.len(), 64, "buffer consumed before the version check");
}

fn topic(i: usize) -> String {
    format!("topic-{i}")
}

/// A request that only carries fields `version` can transmit.
fn fetch_request(version: i16, topics: usize) -> FetchRequest {
    let mut request = FetchRequest::new(version);
    request.max_wait_time = Duration::from_millis(250);
    request.min_bytes = 1;
    if version >= FETCH_MAX_BYTES_VERSION {
        request.max_bytes = 1 << 20;
    }
    if version >= FETCH_ISOLATION_LEVEL_VERSION {
        request.isolation = IsolationLevel::ReadCommitted;
    }
    if version >= FETCH_SESSION_VERSION {
        request.session_id = 77;
        request.session_epoch = 3;
    }
    for i in 0..topics {
        for partition in 0..i as i32 + 1 {
            request.add_block(topic(i), partition, 1000 + i as i64, 4096, 2);
        }
        if version >= FETCH_SESSION_VERSION {
            request.forget_partition(format!("old-{i}"), i as i32);
        }
    }
    if version >= FETCH_LOG_START_OFFSET_VERSION && topics > 0 {
        request.insert_block(
            topic(0),
            9,
            FetchRequestBlock {
                current_leader_epoch: if version >= FETCH_LEADER_EPOCH_VERSION { 4 } else { 0 },
                fetch_offset: 12,
                log_start_offset: 5,
                max_bytes: 512,
            },
        );
    }
    if version >= FETCH_RACK_ID_VERSION {
        request.rack_id = "rack-a".to_string();
    }
    request
}

fn create_topics_request(version: i16, topics: usize) -> CreateTopicsRequest {
    let topic_details = (0..topics)
        .map(|i| {
            let detail = if i % 2 == 0 {
                TopicDetail {
                    num_partitions: i as i32 + 1,
                    replication_factor: 3,
                    config_entries: BTreeMap::from([
                        ("retention.ms".to_string(), Some("60000".to_string())),
                        ("cleanup.policy".to_string(), None),
                    ]),
                    ..Default::default()
                }
            } else {
                TopicDetail {
                    num_partitions: -1,
                    replication_factor: -1,
                    replica_assignment: BTreeMap::from([(0, vec![1, 2]), (1, vec![2, 3])]),
                    ..Default::default()
                }
            };
            (topic(i), detail)
        })
        .collect();
    CreateTopicsRequest {
        version,
        topic_details,
        timeout: Duration::from_secs(30),
        validate_only: version >= CREATE_TOPICS_VALIDATE_ONLY_VERSION,
    }
}

fn create_topics_response(version: i16, topics: usize) -> CreateTopicsResponse {
    let topic_errors = (0..topics)
        .map(|i| {
            let err = match i % 3 {
                0 => TopicError::new(ErrorCode::None),
                1 if version >= TOPIC_ERROR_MESSAGE_VERSION => {
                    TopicError::with_message(ErrorCode::TopicAlreadyExists, "exists")
                }
                _ => TopicError::new(ErrorCode::InvalidReplicationFactor),
            };
            (topic(i), err)
        })
        .collect();
    CreateTopicsResponse {
        version,
        throttle_time: if version >= CREATE_TOPICS_THROTTLE_VERSION {
            Duration::from_millis(15)
        } else {
            Duration::ZERO
        },
        topic_errors,
    }
}

fn delete_topics_request(version: i16, topics: usize) -> DeleteTopicsRequest {
    DeleteTopicsRequest {
        version,
        topics: (0..topics).map(topic).collect(),
        timeout: Duration::from_millis(1500),
    }
}

fn delete_topics_response(version: i16, topics: usize) -> DeleteTopicsResponse {
    DeleteTopicsResponse {
        version,
        throttle_time: if version >= DELETE_TOPICS_THROTTLE_VERSION {
            Duration::from_millis(40)
        } else {
            Duration::ZERO
        },
        topic_error_codes: (0..topics)
            .map(|i| (topic(i), ErrorCode::from_code(i as i16 * 3)))
            .collect(),
    }
}

#[test]
fn fetch_request_round_trips_at_every_version() -> Result<()> {
    for version in 0..=FetchRequest::MAX_VERSION {
        for topics in ENTRY_COUNTS {
            let wire = assert_round_trip(&fetch_request(version, topics))?;
            assert_truncations_underrun::<FetchRequest>(&wire, version);
        }
    }
    Ok(())
}

#[test]
fn create_topics_round_trips_at_every_version() -> Result<()> {
    for version in 0..=CreateTopicsRequest::MAX_VERSION {
        for topics in ENTRY_COUNTS {
            let wire = assert_round_trip(&create_topics_request(version, topics))?;
            assert_truncations_underrun::<CreateTopicsRequest>(&wire, version);

            let wire = assert_round_trip(&create_topics_response(version, topics))?;
            assert_truncations_underrun::<CreateTopicsResponse>(&wire, version);
        }
    }
    Ok(())
}

#[test]
fn delete_topics_round_trips_at_every_version() -> Result<()> {
    for version in 0..=DeleteTopicsRequest::MAX_VERSION {
        for topics in ENTRY_COUNTS {
            let wire = assert_round_trip(&delete_topics_request(version, topics))?;
            assert_truncations_underrun::<DeleteTopicsRequest>(&wire, version);

            let wire = assert_round_trip(&delete_topics_response(version, topics))?;
            assert_truncations_underrun::<DeleteTopicsResponse>(&wire, version);
        }
    }
    Ok(())
}

#[test]
fn unknown_error_codes_survive_a_round_trip() -> Result<()> {
    let response = DeleteTopicsResponse {
        version: 0,
        topic_error_codes: BTreeMap::from([("t".to_string(), ErrorCode::from_code(9999))]),
        ..Default::default()
    };
    assert_round_trip(&response)?;
    assert_eq!(ErrorCode::from_code(9999).code(), 9999);
    Ok(())
}

#[test]
fn versions_outside_the_range_are_rejected() {
    assert_version_gate::<FetchRequest>(-1);
    assert_version_gate::<FetchRequest>(FetchRequest::MAX_VERSION + 1);
    assert_version_gate::<CreateTopicsRequest>(-1);
    assert_version_gate::<CreateTopicsRequest>(CreateTopicsRequest::MAX_VERSION + 1);
    assert_version_gate::<CreateTopicsResponse>(CreateTopicsResponse::MAX_VERSION + 1);
    assert_version_gate::<DeleteTopicsRequest>(DeleteTopicsRequest::MAX_VERSION + 1);
    assert_version_gate::<DeleteTopicsResponse>(-1);

    let mut buf = BytesMut::new();
    let err = DeleteTopicsRequest {
        version: 4,
        ..Default::default()
    }
    .encode(&mut buf)
    .unwrap_err();
    assert!(matches!(err, Error::InvalidVersion { api_key: 20, version: 4 }));
    assert!(buf.is_empty());
}

/// Bytes each Fetch version adds over its predecessor, for a request with
/// one topic holding one partition and nothing forgotten.
const FETCH_GATE_WIDTHS: [(i16, usize); 6] = [
    (FETCH_MAX_BYTES_VERSION, 4),
    (FETCH_ISOLATION_LEVEL_VERSION, 1),
    (FETCH_LOG_START_OFFSET_VERSION, 8),
    (FETCH_SESSION_VERSION, 12),
    (FETCH_LEADER_EPOCH_VERSION, 4),
    (FETCH_RACK_ID_VERSION, 2),
];

/// Field-by-field layout of the single-partition request built in
/// `fetch_fields_appear_exactly_at_their_gates`.
fn expected_fetch_wire(version: i16) -> Vec<u8> {
    let mut wire = Vec::new();
    wire.extend_from_slice(&(-1i32).to_be_bytes()); // replica id
    wire.extend_from_slice(&100i32.to_be_bytes()); // max wait
    wire.extend_from_slice(&0i32.to_be_bytes()); // min bytes
    if version >= FETCH_MAX_BYTES_VERSION {
        wire.extend_from_slice(&0i32.to_be_bytes());
    }
    if version >= FETCH_ISOLATION_LEVEL_VERSION {
        wire.push(0);
    }
    if version >= FETCH_SESSION_VERSION {
        wire.extend_from_slice(&0i32.to_be_bytes()); // session id
        wire.extend_from_slice(&0i32.to_be_bytes()); // session epoch
    }

    wire.extend_from_slice(&1i32.to_be_bytes());
    wire.extend_from_slice(&6i16.to_be_bytes());
    wire.extend_from_slice(b"orders");
    wire.extend_from_slice(&1i32.to_be_bytes());
    wire.extend_from_slice(&0i32.to_be_bytes()); // partition
    if version >= FETCH_LEADER_EPOCH_VERSION {
        wire.extend_from_slice(&1i32.to_be_bytes());
    }
    wire.extend_from_slice(&42i64.to_be_bytes());
    if version >= FETCH_LOG_START_OFFSET_VERSION {
        wire.extend_from_slice(&0i64.to_be_bytes());
    }
    wire.extend_from_slice(&1024i32.to_be_bytes());

    if version >= FETCH_SESSION_VERSION {
        wire.extend_from_slice(&0i32.to_be_bytes()); // nothing forgotten
    }
    if version >= FETCH_RACK_ID_VERSION {
        wire.extend_from_slice(&0i16.to_be_bytes());
    }
    wire
}

#[test]
fn fetch_fields_appear_exactly_at_their_gates() -> Result<()> {
    let single = |version| {
        let mut request = FetchRequest::new(version);
        request.max_wait_time = Duration::from_millis(100);
        request.add_block("orders", 0, 42, 1024, 1);
        request
    };

    let base = encode(&single(0))?;
    assert_eq!(base.len(), 44);

    for version in 0..=FetchRequest::MAX_VERSION {
        let expected = base.len()
            + FETCH_GATE_WIDTHS
                .iter()
                .filter(|(gate, _)| version >= *gate)
                .map(|(_, width)| width)
                .sum::<usize>();
        let wire = encode(&single(version))?;
        assert_eq!(wire.len(), expected, "version {version}");
        assert_eq!(wire.to_vec(), expected_fetch_wire(version), "version {version}");
    }
    Ok(())
}

#[test]
fn fetch_versions_without_new_gates_encode_identically() -> Result<()> {
    let single = |version| {
        let mut request = FetchRequest::new(version);
        request.add_block("orders", 3, 7, 512, 2);
        request
    };
    for version in 1..=FetchRequest::MAX_VERSION {
        let opens_gate = FETCH_GATE_WIDTHS.iter().any(|(gate, _)| *gate == version);
        if !opens_gate {
            assert_eq!(
                encode(&single(version))?,
                encode(&single(version - 1))?,
                "version {version}"
            );
        }
    }
    Ok(())
}

#[test]
fn default_release_picks_versions() {
    let release = KafkaRelease::default();
    assert_eq!(FetchRequest::for_release(release).version, 10);
    assert_eq!(
        DeleteTopicsRequest::new(release, vec![], Duration::ZERO).version,
        3
    );
    assert_eq!(
        CreateTopicsRequest::new(release, BTreeMap::new(), Duration::ZERO, false).version,
        3
    );
    assert_eq!(
        CreateTopicsRequest::new(KafkaRelease::V0_10_1_0, BTreeMap::new(), Duration::ZERO, false)
            .version,
        0
    );
}

//! Numeric identifiers of the remote operations

use bytes::{Buf, BufMut};
use num_derive::{FromPrimitive, ToPrimitive};
use wirelog_common::{Error, Result};

use crate::codec::{Decodable, Encodable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, ToPrimitive)]
#[repr(i16)]
pub enum ApiKey {
    Produce = 0,
    Fetch = 1,
    ListOffsets = 2,
    Metadata = 3,
    LeaderAndIsr = 4,
    StopReplica = 5,
    UpdateMetadata = 6,
    ControlledShutdown = 7,
    OffsetCommit = 8,
    OffsetFetch = 9,
    FindCoordinator = 10,
    JoinGroup = 11,
    Heartbeat = 12,
    LeaveGroup = 13,
    SyncGroup = 14,
    DescribeGroups = 15,
    ListGroups = 16,
    SaslHandshake = 17,
    ApiVersions = 18,
    CreateTopics = 19,
    DeleteTopics = 20,
}

impl ApiKey {
    pub fn from_i16(key: i16) -> Result<Self> {
        <ApiKey as num_traits::FromPrimitive>::from_i16(key).ok_or(Error::UnknownApiKey(key))
    }
}

impl TryFrom<i16> for ApiKey {
    type Error = Error;

    fn try_from(key: i16) -> Result<Self> {
        ApiKey::from_i16(key)
    }
}

impl Encodable for ApiKey {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        (*self as i16).encode(buf)
    }
}

impl Decodable for ApiKey {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        ApiKey::from_i16(i16::decode(buf)?)
    }
}

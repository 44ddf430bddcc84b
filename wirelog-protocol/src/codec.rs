//! Traits for encoding and decoding Kafka protocol messages

use std::time::Duration;

use bytes::{Buf, BufMut};
use wirelog_common::{Error, Result};

use crate::api_keys::ApiKey;
use crate::metrics::{MetricRegistry, NoopRegistry};
use crate::release::KafkaRelease;

/// A type that can be encoded into a buffer.
///
/// Implemented by the primitive wire types, whose layout never depends on
/// the negotiated version.
pub trait Encodable {
    /// Encode a value into a buffer.
    fn encode(&self, buf: &mut impl BufMut) -> Result<()>;
}

/// A type that can be decoded from a buffer.
pub trait Decodable: Sized {
    /// Decode a value from a buffer, failing before any read that would run
    /// past the end of it.
    fn decode(buf: &mut impl Buf) -> Result<Self>;
}

/// A nested structure whose layout depends on the version of the message
/// that contains it.
pub trait VersionedEncodable {
    /// Encode using the enclosing message's negotiated version.
    fn encode_versioned(&self, buf: &mut impl BufMut, version: i16) -> Result<()>;
}

/// Decoding counterpart of [`VersionedEncodable`].
pub trait VersionedDecodable: Sized {
    /// Decode using the enclosing message's negotiated version.
    fn decode_versioned(buf: &mut impl Buf, version: i16) -> Result<Self>;
}

/// The contract every request and response body implements.
///
/// All bodies support versions `0..=MAX_VERSION`. Field presence is a pure
/// function of the version, and the threshold used by `encode_body` for a
/// field must be the one `decode_body` uses for it.
pub trait ProtocolBody: Sized {
    /// The operation this body belongs to.
    const API_KEY: ApiKey;
    /// Highest version this body can be encoded as.
    const MAX_VERSION: i16;

    /// The version this value encodes as, or was decoded from.
    fn version(&self) -> i16;

    /// The request/response header variant that frames this body.
    fn header_version(&self) -> i16;

    /// Oldest broker release that understands `version`. Versions outside the
    /// supported range map to the newest release the body knows about.
    fn release_for_version(version: i16) -> KafkaRelease;

    /// Write the body at `self.version()`. The version has already been checked.
    fn encode_body(&self, buf: &mut impl BufMut, metrics: &dyn MetricRegistry) -> Result<()>;

    /// Read a body laid out for `version`. The version has already been checked.
    fn decode_body(buf: &mut impl Buf, version: i16) -> Result<Self>;

    /// Numeric identifier of the remote operation.
    fn api_key(&self) -> ApiKey {
        Self::API_KEY
    }

    fn supports_version(version: i16) -> bool {
        (0..=Self::MAX_VERSION).contains(&version)
    }

    fn is_valid_version(&self) -> bool {
        Self::supports_version(self.version())
    }

    fn required_release(&self) -> KafkaRelease {
        Self::release_for_version(self.version())
    }

    /// The highest version a broker running `release` accepts, or 0 when the
    /// release predates every version.
    fn highest_version_for(release: KafkaRelease) -> i16 {
        (0..=Self::MAX_VERSION)
            .rev()
            .find(|&version| Self::release_for_version(version) <= release)
            .unwrap_or(0)
    }

    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        self.encode_with_metrics(buf, &NoopRegistry)
    }

    /// Encode, reporting per-topic activity to `metrics`.
    fn encode_with_metrics(&self, buf: &mut impl BufMut, metrics: &dyn MetricRegistry) -> Result<()> {
        if !self.is_valid_version() {
            return Err(Error::InvalidVersion {
                api_key: Self::API_KEY as i16,
                version: self.version(),
            });
        }
        self.encode_body(buf, metrics)
    }

    fn decode(buf: &mut impl Buf, version: i16) -> Result<Self> {
        if !Self::supports_version(version) {
            return Err(Error::InvalidVersion {
                api_key: Self::API_KEY as i16,
                version,
            });
        }
        Self::decode_body(buf, version)
    }
}

/// Bodies that carry a broker-imposed throttle delay.
pub trait ThrottleReporting {
    /// How long the broker asked the client to back off.
    fn throttle_time(&self) -> Duration;
}

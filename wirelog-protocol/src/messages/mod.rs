//! Kafka protocol message bodies

use std::time::Duration;

use bytes::{Buf, BufMut};
use wirelog_common::{Error, Result};

use crate::codec::{Decodable, Encodable};

pub mod create_topics;
pub mod delete_topics;
pub mod fetch_request;

pub use create_topics::*;
pub use delete_topics::*;
pub use fetch_request::*;

/// Write a duration as whole milliseconds in an `i32`.
pub(crate) fn encode_millis(duration: Duration, buf: &mut impl BufMut) -> Result<()> {
    let millis = duration.as_millis();
    let millis = i32::try_from(millis).map_err(|_| Error::SizeLimit {
        what: "duration in milliseconds",
        length: usize::try_from(millis).unwrap_or(usize::MAX),
        max: i32::MAX as usize,
    })?;
    millis.encode(buf)
}

/// Read an `i32` millisecond duration. Negative values mean "do not wait"
/// and read as zero.
pub(crate) fn decode_millis(buf: &mut impl Buf) -> Result<Duration> {
    let millis = i32::decode(buf)?;
    Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
}

//! Wire codec for broker error codes and per-topic error entries

use std::fmt;

use bytes::{Buf, BufMut};
use wirelog_common::Result;

pub use wirelog_common::ErrorCode;

use crate::codec::{Decodable, Encodable, VersionedDecodable, VersionedEncodable};
use crate::primitives::{get_nullable_string, put_nullable_string};

/// First version at which a topic error carries a descriptive message.
pub const TOPIC_ERROR_MESSAGE_VERSION: i16 = 1;

impl Encodable for ErrorCode {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        self.code().encode(buf)
    }
}

impl Decodable for ErrorCode {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        Ok(ErrorCode::from_code(i16::decode(buf)?))
    }
}

/// A broker-reported error for one topic: the code and, from version 1, an
/// optional message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicError {
    pub err: ErrorCode,
    pub err_msg: Option<String>,
}

impl TopicError {
    pub fn new(err: ErrorCode) -> Self {
        Self { err, err_msg: None }
    }

    pub fn with_message(err: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            err,
            err_msg: Some(message.into()),
        }
    }

    /// The underlying code, for callers that only classify errors.
    pub fn cause(&self) -> ErrorCode {
        self.err
    }
}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.err_msg {
            Some(message) => write!(f, "{} - {}", self.err, message),
            None => write!(f, "{}", self.err),
        }
    }
}

impl std::error::Error for TopicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

impl VersionedEncodable for TopicError {
    fn encode_versioned(&self, buf: &mut impl BufMut, version: i16) -> Result<()> {
        self.err.encode(buf)?;
        if version >= TOPIC_ERROR_MESSAGE_VERSION {
            put_nullable_string(buf, self.err_msg.as_deref())?;
        }
        Ok(())
    }
}

impl VersionedDecodable for TopicError {
    fn decode_versioned(buf: &mut impl Buf, version: i16) -> Result<Self> {
        let err = ErrorCode::decode(buf)?;
        let err_msg = if version >= TOPIC_ERROR_MESSAGE_VERSION {
            get_nullable_string(buf)?
        } else {
            None
        };
        Ok(Self { err, err_msg })
    }
}

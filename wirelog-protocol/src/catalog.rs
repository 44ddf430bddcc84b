//! Closed set of bodies the codec knows, dispatched by API key

use std::time::Duration;

use bytes::{Buf, BufMut};
use tracing::{debug, warn};
use wirelog_common::{Error, Result};

use crate::api_keys::ApiKey;
use crate::codec::{ProtocolBody, ThrottleReporting};
use crate::messages::{
    CreateTopicsRequest, CreateTopicsResponse, DeleteTopicsRequest, DeleteTopicsResponse,
    FetchRequest,
};
use crate::metrics::MetricRegistry;
use crate::release::KafkaRelease;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Fetch(FetchRequest),
    CreateTopics(CreateTopicsRequest),
    DeleteTopics(DeleteTopicsRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    CreateTopics(CreateTopicsResponse),
    DeleteTopics(DeleteTopicsResponse),
}

macro_rules! each_request {
    ($value:expr, $body:ident => $e:expr) => {
        match $value {
            RequestBody::Fetch($body) => $e,
            RequestBody::CreateTopics($body) => $e,
            RequestBody::DeleteTopics($body) => $e,
        }
    };
}

macro_rules! each_response {
    ($value:expr, $body:ident => $e:expr) => {
        match $value {
            ResponseBody::CreateTopics($body) => $e,
            ResponseBody::DeleteTopics($body) => $e,
        }
    };
}

fn ensure_consumed(buf: &impl Buf) -> Result<()> {
    if buf.has_remaining() {
        warn!(remaining = buf.remaining(), "bytes left after message body");
        return Err(Error::TrailingBytes(buf.remaining()));
    }
    Ok(())
}

impl RequestBody {
    pub fn api_key(&self) -> ApiKey {
        each_request!(self, body => body.api_key())
    }

    pub fn version(&self) -> i16 {
        each_request!(self, body => body.version())
    }

    pub fn header_version(&self) -> i16 {
        each_request!(self, body => body.header_version())
    }

    pub fn is_valid_version(&self) -> bool {
        each_request!(self, body => body.is_valid_version())
    }

    pub fn required_release(&self) -> KafkaRelease {
        each_request!(self, body => body.required_release())
    }

    pub fn encode(&self, buf: &mut impl BufMut, metrics: &dyn MetricRegistry) -> Result<()> {
        each_request!(self, body => body.encode_with_metrics(buf, metrics))
    }

    /// Decode a complete request body. Every byte of `buf` must belong to it.
    pub fn decode(api_key: ApiKey, version: i16, buf: &mut impl Buf) -> Result<Self> {
        debug!(?api_key, version, len = buf.remaining(), "decoding request body");
        let body = match api_key {
            ApiKey::Fetch => RequestBody::Fetch(FetchRequest::decode(buf, version)?),
            ApiKey::CreateTopics => {
                RequestBody::CreateTopics(CreateTopicsRequest::decode(buf, version)?)
            }
            ApiKey::DeleteTopics => {
                RequestBody::DeleteTopics(DeleteTopicsRequest::decode(buf, version)?)
            }
            other => {
                return Err(Error::UnsupportedApi {
                    api_key: other as i16,
                    kind: "request",
                })
            }
        };
        ensure_consumed(buf)?;
        Ok(body)
    }
}

impl ResponseBody {
    pub fn api_key(&self) -> ApiKey {
        each_response!(self, body => body.api_key())
    }

    pub fn version(&self) -> i16 {
        each_response!(self, body => body.version())
    }

    pub fn header_version(&self) -> i16 {
        each_response!(self, body => body.header_version())
    }

    pub fn is_valid_version(&self) -> bool {
        each_response!(self, body => body.is_valid_version())
    }

    pub fn required_release(&self) -> KafkaRelease {
        each_response!(self, body => body.required_release())
    }

    /// Throttle delay for bodies that report one.
    pub fn throttle_time(&self) -> Option<Duration> {
        each_response!(self, body => Some(body.throttle_time()))
    }

    pub fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        each_response!(self, body => ProtocolBody::encode(body, buf))
    }

    /// Decode a complete response body. Every byte of `buf` must belong to it.
    pub fn decode(api_key: ApiKey, version: i16, buf: &mut impl Buf) -> Result<Self> {
        debug!(?api_key, version, len = buf.remaining(), "decoding response body");
        let body = match api_key {
            ApiKey::CreateTopics => {
                ResponseBody::CreateTopics(CreateTopicsResponse::decode(buf, version)?)
            }
            ApiKey::DeleteTopics => {
                ResponseBody::DeleteTopics(DeleteTopicsResponse::decode(buf, version)?)
            }
            other => {
                return Err(Error::UnsupportedApi {
                    api_key: other as i16,
                    kind: "response",
                })
            }
        };
        ensure_consumed(buf)?;
        Ok(body)
    }
}

impl From<FetchRequest> for RequestBody {
    fn from(request: FetchRequest) -> Self {
        RequestBody::Fetch(request)
    }
}

impl From<CreateTopicsRequest> for RequestBody {
    fn from(request: CreateTopicsRequest) -> Self {
        RequestBody::CreateTopics(request)
    }
}

impl From<DeleteTopicsRequest> for RequestBody {
    fn from(request: DeleteTopicsRequest) -> Self {
        RequestBody::DeleteTopics(request)
    }
}

impl From<CreateTopicsResponse> for ResponseBody {
    fn from(response: CreateTopicsResponse) -> Self {
        ResponseBody::CreateTopics(response)
    }
}

impl From<DeleteTopicsResponse> for ResponseBody {
    fn from(response: DeleteTopicsResponse) -> Self {
        ResponseBody::DeleteTopics(response)
    }
}

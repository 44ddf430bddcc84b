//! Error types shared by the wirelog crates

/// A specialized `Result` type for wirelog operations
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for wirelog encode and decode operations.
///
/// Broker-reported error codes are not represented here: they decode
/// successfully as [`crate::ErrorCode`] values inside response bodies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fewer bytes remain in the buffer than the next field requires
    #[error("insufficient data: needed {needed} bytes but only {remaining} remain")]
    InsufficientData {
        /// Bytes the field needs
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// A length prefix is negative and is not the null sentinel
    #[error("malformed {what} length: {length}")]
    MalformedLength {
        /// The kind of structure the length belongs to
        what: &'static str,
        /// The length read from the wire
        length: i32,
    },

    /// A value is too large to be represented on the wire
    #[error("{what} of size {length} exceeds maximum {max}")]
    SizeLimit {
        /// The kind of value being encoded
        what: &'static str,
        /// The size that was requested
        length: usize,
        /// The largest size the wire format allows
        max: usize,
    },

    /// A message was encoded or decoded at a version outside its supported range
    #[error("version {version} is not valid for API key {api_key}")]
    InvalidVersion {
        /// The API key of the message
        api_key: i16,
        /// The rejected version
        version: i16,
    },

    /// A string field did not hold UTF-8
    #[error("invalid UTF-8 string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An API key that does not correspond to any known operation
    #[error("unknown API key: {0}")]
    UnknownApiKey(i16),

    /// A known API key that has no body of the requested kind in the catalog
    #[error("no {kind} body registered for API key {api_key}")]
    UnsupportedApi {
        /// The API key that was requested
        api_key: i16,
        /// `"request"` or `"response"`
        kind: &'static str,
    },

    /// A complete body was decoded but bytes were left over
    #[error("{0} trailing bytes after message body")]
    TrailingBytes(usize),

    /// A field held a value outside its domain
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization/deserialization error occurred
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An invalid argument was provided
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// True for the failure a truncated buffer produces.
    pub fn is_underrun(&self) -> bool {
        matches!(self, Error::InsufficientData { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            e => std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        }
    }
}

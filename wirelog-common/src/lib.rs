//! Common types and utilities for the wirelog protocol crates

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod error_code;
pub mod logging;

pub use error::{Error, Result};
pub use error_code::ErrorCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));

        let json_error: Error = serde_json::from_str::<i32>("invalid").unwrap_err().into();
        assert!(matches!(json_error, Error::Serialization(_)));
    }

    #[test]
    fn test_underrun_classification() {
        let err = Error::InsufficientData {
            needed: 4,
            remaining: 1,
        };
        assert!(err.is_underrun());
        assert_eq!(
            err.to_string(),
            "insufficient data: needed 4 bytes but only 1 remain"
        );
        assert!(!Error::TrailingBytes(2).is_underrun());
    }

    #[test]
    fn test_codec_error_into_io() {
        let err: std::io::Error = Error::TrailingBytes(3).into();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}

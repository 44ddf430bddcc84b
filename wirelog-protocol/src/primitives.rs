//! Primitive types used in the Kafka protocol
//!
//! Integers are fixed-width big-endian. Strings carry an `i16` length prefix,
//! byte blobs and arrays an `i32` one; `-1` marks a null value for all three.

use bytes::{Buf, BufMut, Bytes};
use wirelog_common::{Error, Result};

use crate::codec::{Decodable, Encodable};

/// Length prefix that marks a null string, byte blob or array.
pub const NULL_LENGTH: i32 = -1;

/// Longest string the `i16` length prefix can describe.
pub const MAX_STRING_LENGTH: usize = i16::MAX as usize;

/// Largest element count or byte-blob size the `i32` length prefix can describe.
pub const MAX_ARRAY_LENGTH: usize = i32::MAX as usize;

/// Fail with [`Error::InsufficientData`] unless `needed` more bytes are available.
pub fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<()> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(Error::InsufficientData { needed, remaining });
    }
    Ok(())
}

// --- Integers ---

macro_rules! impl_codec_for_int {
    ($($t:ty => $put:ident, $get:ident);* $(;)?) => {
        $(
            impl Encodable for $t {
                fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
                    buf.$put(*self);
                    Ok(())
                }
            }

            impl Decodable for $t {
                fn decode(buf: &mut impl Buf) -> Result<Self> {
                    ensure_remaining(buf, std::mem::size_of::<Self>())?;
                    Ok(buf.$get())
                }
            }
        )*
    };
}

impl_codec_for_int!(
    i8 => put_i8, get_i8;
    i16 => put_i16, get_i16;
    i32 => put_i32, get_i32;
    i64 => put_i64, get_i64;
);

// --- Boolean ---

impl Encodable for bool {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        (*self as i8).encode(buf)
    }
}

impl Decodable for bool {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        Ok(i8::decode(buf)? != 0)
    }
}

// --- Strings ---

pub fn put_string(buf: &mut impl BufMut, s: &str) -> Result<()> {
    if s.len() > MAX_STRING_LENGTH {
        return Err(Error::SizeLimit {
            what: "string",
            length: s.len(),
            max: MAX_STRING_LENGTH,
        });
    }
    buf.put_i16(s.len() as i16);
    buf.put_slice(s.as_bytes());
    Ok(())
}

pub fn put_nullable_string(buf: &mut impl BufMut, s: Option<&str>) -> Result<()> {
    match s {
        Some(s) => put_string(buf, s),
        None => {
            buf.put_i16(NULL_LENGTH as i16);
            Ok(())
        }
    }
}

fn get_string_length(buf: &mut impl Buf) -> Result<Option<usize>> {
    let len = i16::decode(buf)?;
    if len == NULL_LENGTH as i16 {
        return Ok(None);
    }
    if len < 0 {
        return Err(Error::MalformedLength {
            what: "string",
            length: len.into(),
        });
    }
    let len = len as usize;
    ensure_remaining(buf, len)?;
    Ok(Some(len))
}

fn take_utf8(buf: &mut impl Buf, len: usize) -> Result<String> {
    let bytes = buf.copy_to_bytes(len);
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Read a non-nullable string. A null on the wire reads as the empty string.
pub fn get_string(buf: &mut impl Buf) -> Result<String> {
    match get_string_length(buf)? {
        Some(len) => take_utf8(buf, len),
        None => Ok(String::new()),
    }
}

pub fn get_nullable_string(buf: &mut impl Buf) -> Result<Option<String>> {
    get_string_length(buf)?
        .map(|len| take_utf8(buf, len))
        .transpose()
}

impl Encodable for String {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        put_string(buf, self)
    }
}

impl Decodable for String {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        get_string(buf)
    }
}

impl Encodable for Option<String> {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        put_nullable_string(buf, self.as_deref())
    }
}

impl Decodable for Option<String> {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        get_nullable_string(buf)
    }
}

// --- Byte blobs ---

pub fn put_bytes(buf: &mut impl BufMut, bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_ARRAY_LENGTH {
        return Err(Error::SizeLimit {
            what: "byte array",
            length: bytes.len(),
            max: MAX_ARRAY_LENGTH,
        });
    }
    buf.put_i32(bytes.len() as i32);
    buf.put_slice(bytes);
    Ok(())
}

pub fn put_nullable_bytes(buf: &mut impl BufMut, bytes: Option<&[u8]>) -> Result<()> {
    match bytes {
        Some(bytes) => put_bytes(buf, bytes),
        None => {
            buf.put_i32(NULL_LENGTH);
            Ok(())
        }
    }
}

fn get_bytes_length(buf: &mut impl Buf) -> Result<Option<usize>> {
    let len = i32::decode(buf)?;
    if len == NULL_LENGTH {
        return Ok(None);
    }
    if len < 0 {
        return Err(Error::MalformedLength {
            what: "byte array",
            length: len,
        });
    }
    let len = len as usize;
    ensure_remaining(buf, len)?;
    Ok(Some(len))
}

/// Read a non-nullable byte blob. A null on the wire reads as empty.
pub fn get_bytes(buf: &mut impl Buf) -> Result<Bytes> {
    Ok(get_nullable_bytes(buf)?.unwrap_or_default())
}

pub fn get_nullable_bytes(buf: &mut impl Buf) -> Result<Option<Bytes>> {
    Ok(get_bytes_length(buf)?.map(|len| buf.copy_to_bytes(len)))
}

impl Encodable for Bytes {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        put_bytes(buf, self)
    }
}

impl Decodable for Bytes {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        get_bytes(buf)
    }
}

impl Encodable for Option<Bytes> {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        put_nullable_bytes(buf, self.as_deref())
    }
}

impl Decodable for Option<Bytes> {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        get_nullable_bytes(buf)
    }
}

// --- Arrays ---

pub fn put_array_length(buf: &mut impl BufMut, len: usize) -> Result<()> {
    if len > MAX_ARRAY_LENGTH {
        return Err(Error::SizeLimit {
            what: "array",
            length: len,
            max: MAX_ARRAY_LENGTH,
        });
    }
    buf.put_i32(len as i32);
    Ok(())
}

pub fn put_null_array(buf: &mut impl BufMut) {
    buf.put_i32(NULL_LENGTH);
}

/// Read an array element count; `None` is a null array.
///
/// Every element takes at least one byte, so a count larger than what is
/// left in the buffer is reported as an underrun before anything is allocated.
pub fn get_array_length(buf: &mut impl Buf) -> Result<Option<usize>> {
    let len = i32::decode(buf)?;
    if len == NULL_LENGTH {
        return Ok(None);
    }
    if len < 0 {
        return Err(Error::MalformedLength {
            what: "array",
            length: len,
        });
    }
    let len = len as usize;
    ensure_remaining(buf, len)?;
    Ok(Some(len))
}

fn decode_elements<T: Decodable>(buf: &mut impl Buf, len: usize) -> Result<Vec<T>> {
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(T::decode(buf)?);
    }
    Ok(items)
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        put_array_length(buf, self.len())?;
        for item in self {
            item.encode(buf)?;
        }
        Ok(())
    }
}

/// A null array decodes as empty; use `Option<Vec<T>>` where the distinction matters.
impl<T: Decodable> Decodable for Vec<T> {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        let len = get_array_length(buf)?.unwrap_or(0);
        decode_elements(buf, len)
    }
}

impl<T: Encodable> Encodable for Option<Vec<T>> {
    fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        match self {
            Some(items) => items.encode(buf),
            None => {
                put_null_array(buf);
                Ok(())
            }
        }
    }
}

impl<T: Decodable> Decodable for Option<Vec<T>> {
    fn decode(buf: &mut impl Buf) -> Result<Self> {
        get_array_length(buf)?
            .map(|len| decode_elements(buf, len))
            .transpose()
    }
}

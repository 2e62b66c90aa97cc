//! Length-delimited protobuf types (`bytes`, `string`).

use alloc::string::String;
use alloc::vec::Vec;

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::{self, WireType};

/// Wrapper for protobuf `bytes` fields (length-delimited raw bytes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtoBytes(Vec<u8>);

impl core::ops::Deref for ProtoBytes {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<u8>> for ProtoBytes {
    fn from(b: Vec<u8>) -> Self {
        ProtoBytes(b)
    }
}

impl From<&[u8]> for ProtoBytes {
    fn from(b: &[u8]) -> Self {
        ProtoBytes(b.to_vec())
    }
}

impl ProtoType for ProtoBytes {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoDecode for ProtoBytes {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let len = wire::decode_len(cur)?;
        dst.0 = cur.read_slice(len)?.to_vec();
        Ok(())
    }
}

impl ProtoEncode for ProtoBytes {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        (self.0.len() as u64).encode_leb128(sink);
        sink.put_slice(&self.0);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (self.0.len() as u64).encoded_leb128_len() + self.0.len()
    }
}

/// Wrapper for protobuf `string` fields (length-delimited UTF-8 text).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtoString(String);

impl ProtoString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::ops::Deref for ProtoString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl From<&str> for ProtoString {
    fn from(s: &str) -> Self {
        ProtoString(String::from(s))
    }
}

impl From<String> for ProtoString {
    fn from(s: String) -> Self {
        ProtoString(s)
    }
}

impl ProtoType for ProtoString {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoDecode for ProtoString {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let len = wire::decode_len(cur)?;
        let raw = cur.read_slice(len)?;
        let s = core::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
        dst.0.clear();
        dst.0.push_str(s);
        Ok(())
    }
}

impl ProtoEncode for ProtoString {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        (self.0.len() as u64).encode_leb128(sink);
        sink.put_slice(self.0.as_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (self.0.len() as u64).encoded_leb128_len() + self.0.len()
    }
}

impl ProtoType for String {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoDecode for String {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let len = wire::decode_len(cur)?;
        let raw = cur.read_slice(len)?;
        let s = core::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
        dst.clear();
        dst.push_str(s);
        Ok(())
    }
}

impl ProtoEncode for String {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        (self.len() as u64).encode_leb128(sink);
        sink.put_slice(self.as_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (self.len() as u64).encoded_leb128_len() + self.len()
    }
}

impl ProtoType for Vec<u8> {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoDecode for Vec<u8> {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let len = wire::decode_len(cur)?;
        dst.clear();
        dst.extend_from_slice(cur.read_slice(len)?);
        Ok(())
    }
}

impl ProtoEncode for Vec<u8> {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        (self.len() as u64).encode_leb128(sink);
        sink.put_slice(self);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        (self.len() as u64).encoded_leb128_len() + self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::WriteCursor;
    use alloc::vec;

    fn roundtrip<T: ProtoEncode + ProtoDecode + PartialEq + core::fmt::Debug + Default>(value: T) {
        let mut buf = Vec::new();
        value.encode(&mut WriteCursor::new(&mut buf));
        assert_eq!(buf.len(), value.encoded_len());
        let mut decoded = T::default();
        T::decode_into(&mut ReadCursor::new(&buf), &mut decoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_proto_bytes_roundtrip() {
        roundtrip(ProtoBytes::from(&[][..]));
        roundtrip(ProtoBytes::from(&[1, 2, 3][..]));
        roundtrip(ProtoBytes::from(&[0u8; 300][..]));
    }

    #[test]
    fn test_proto_string_roundtrip() {
        roundtrip(ProtoString::from(""));
        roundtrip(ProtoString::from("hello"));
        roundtrip(ProtoString::from("hello world! 🎉"));
    }

    #[test]
    fn test_proto_string_deref() {
        let s = ProtoString::from("hello");
        assert_eq!(&*s, "hello");
        assert_eq!(s.len(), 5);
        assert!(s.starts_with("hel"));
    }

    #[test]
    fn test_proto_string_invalid_utf8() {
        let buf = [3u8, 0xff, 0xfe, 0xfd];
        let mut decoded = ProtoString::default();
        let result = ProtoString::decode_into(&mut ReadCursor::new(&buf), &mut decoded);
        assert!(result.is_err());
    }

    #[test]
    fn test_string_roundtrip() {
        roundtrip(String::new());
        roundtrip(String::from("hello"));
        roundtrip(String::from("hello world! 🎉"));
        roundtrip("a".repeat(300));
    }

    #[test]
    fn test_vec_u8_roundtrip() {
        roundtrip(Vec::<u8>::new());
        roundtrip(vec![1u8, 2, 3]);
        roundtrip(vec![0u8; 300]);
        roundtrip((0u8..=255).collect::<Vec<_>>());
    }

    #[test]
    fn test_string_and_proto_string_compatible() {
        let original = String::from("hello");
        let mut buf = Vec::new();
        original.encode(&mut WriteCursor::new(&mut buf));

        let mut decoded = ProtoString::default();
        ProtoString::decode_into(&mut ReadCursor::new(&buf), &mut decoded).unwrap();
        assert_eq!(decoded.as_str(), "hello");

        let original = ProtoString::from("world");
        let mut buf = Vec::new();
        original.encode(&mut WriteCursor::new(&mut buf));

        let mut decoded = String::default();
        String::decode_into(&mut ReadCursor::new(&buf), &mut decoded).unwrap();
        assert_eq!(decoded, "world");
    }

    #[test]
    fn test_vec_u8_and_proto_bytes_compatible() {
        let original = vec![1u8, 2, 3, 4, 5];
        let mut buf = Vec::new();
        original.encode(&mut WriteCursor::new(&mut buf));

        let mut decoded = ProtoBytes::default();
        ProtoBytes::decode_into(&mut ReadCursor::new(&buf), &mut decoded).unwrap();
        assert_eq!(&*decoded, &[1, 2, 3, 4, 5]);

        let original = ProtoBytes::from(&[6u8, 7, 8, 9, 10][..]);
        let mut buf = Vec::new();
        original.encode(&mut WriteCursor::new(&mut buf));

        let mut decoded = Vec::<u8>::default();
        Vec::<u8>::decode_into(&mut ReadCursor::new(&buf), &mut decoded).unwrap();
        assert_eq!(decoded, vec![6, 7, 8, 9, 10]);
    }
}

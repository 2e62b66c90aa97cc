//! Scalar protobuf types and their encoding/decoding implementations.

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::util::{CastFrom, ReinterpretCastFrom};
use crate::wire::WireType;

impl ProtoType for u64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for u64 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u64::decode_leb128(cur)?;
        Ok(())
    }
}

impl ProtoEncode for u64 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        self.encode_leb128(sink);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.encoded_leb128_len()
    }
}

impl ProtoType for u32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for u32 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u32::decode_leb128(cur)?;
        Ok(())
    }
}

impl ProtoEncode for u32 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        self.encode_leb128(sink);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.encoded_leb128_len()
    }
}

impl ProtoType for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for i64 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = i64::reinterpret_cast_from(u64::decode_leb128(cur)?);
        Ok(())
    }
}

impl ProtoEncode for i64 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        u64::reinterpret_cast_from(*self).encode_leb128(sink);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        u64::reinterpret_cast_from(*self).encoded_leb128_len()
    }
}

impl ProtoType for i32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for i32 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        // Protobuf int32 is encoded as a varint, sign-extended to 64 bits.
        let v = i64::reinterpret_cast_from(u64::decode_leb128(cur)?);
        *dst = i32::try_from(v).map_err(|_| DecodeError::OverflowOnDecode("i32"))?;
        Ok(())
    }
}

impl ProtoEncode for i32 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        // Negative values are sign-extended to 64 bits before encoding.
        let val = i64::cast_from(*self);
        u64::reinterpret_cast_from(val).encode_leb128(sink);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        let val = i64::cast_from(*self);
        u64::reinterpret_cast_from(val).encoded_leb128_len()
    }
}

impl ProtoType for bool {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for bool {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = u64::decode_leb128(cur)? != 0;
        Ok(())
    }
}

impl ProtoEncode for bool {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        sink.put_u8(if *self { 1 } else { 0 });
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        1
    }
}

#[inline(always)]
pub(crate) fn zigzag_encode_32(n: i32) -> u32 {
    let val = (n << 1) ^ (n >> 31);
    u32::reinterpret_cast_from(val)
}

#[inline(always)]
pub(crate) fn zigzag_decode_32(n: u32) -> i32 {
    i32::reinterpret_cast_from(n >> 1) ^ -i32::reinterpret_cast_from(n & 1)
}

/// Wrapper for protobuf `sint32` (zigzag-encoded signed 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Sint32(pub i32);

impl core::ops::Deref for Sint32 {
    type Target = i32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Sint32 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for Sint32 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint32(zigzag_decode_32(u32::decode_leb128(cur)?));
        Ok(())
    }
}

impl ProtoEncode for Sint32 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        zigzag_encode_32(self.0).encode_leb128(sink);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_32(self.0).encoded_leb128_len()
    }
}

#[inline(always)]
pub(crate) fn zigzag_encode_64(n: i64) -> u64 {
    u64::reinterpret_cast_from((n << 1) ^ (n >> 63))
}

#[inline(always)]
pub(crate) fn zigzag_decode_64(n: u64) -> i64 {
    i64::reinterpret_cast_from(n >> 1) ^ -i64::reinterpret_cast_from(n & 1)
}

/// Wrapper for protobuf `sint64` (zigzag-encoded signed 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Sint64(pub i64);

impl core::ops::Deref for Sint64 {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Sint64 {
    const WIRE_TYPE: WireType = WireType::Varint;
}

impl ProtoDecode for Sint64 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        *dst = Sint64(zigzag_decode_64(u64::decode_leb128(cur)?));
        Ok(())
    }
}

impl ProtoEncode for Sint64 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        zigzag_encode_64(self.0).encode_leb128(sink);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        zigzag_encode_64(self.0).encoded_leb128_len()
    }
}

/// Wrapper for protobuf `fixed32` (little-endian unsigned 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Fixed32(pub u32);

impl core::ops::Deref for Fixed32 {
    type Target = u32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Fixed32 {
    const WIRE_TYPE: WireType = WireType::I32;
}

impl ProtoDecode for Fixed32 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let bytes: [u8; 4] = cur.read_slice(4)?.try_into().expect("exactly 4 bytes");
        *dst = Fixed32(u32::from_le_bytes(bytes));
        Ok(())
    }
}

impl ProtoEncode for Fixed32 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        sink.put_slice(&self.0.to_le_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        4
    }
}

/// Wrapper for protobuf `fixed64` (little-endian unsigned 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Fixed64(pub u64);

impl core::ops::Deref for Fixed64 {
    type Target = u64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Fixed64 {
    const WIRE_TYPE: WireType = WireType::I64;
}

impl ProtoDecode for Fixed64 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let bytes: [u8; 8] = cur.read_slice(8)?.try_into().expect("exactly 8 bytes");
        *dst = Fixed64(u64::from_le_bytes(bytes));
        Ok(())
    }
}

impl ProtoEncode for Fixed64 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        sink.put_slice(&self.0.to_le_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        8
    }
}

/// Wrapper for protobuf `sfixed32` (little-endian signed 32-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Sfixed32(pub i32);

impl core::ops::Deref for Sfixed32 {
    type Target = i32;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Sfixed32 {
    const WIRE_TYPE: WireType = WireType::I32;
}

impl ProtoDecode for Sfixed32 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let bytes: [u8; 4] = cur.read_slice(4)?.try_into().expect("exactly 4 bytes");
        *dst = Sfixed32(i32::from_le_bytes(bytes));
        Ok(())
    }
}

impl ProtoEncode for Sfixed32 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        sink.put_slice(&self.0.to_le_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        4
    }
}

/// Wrapper for protobuf `sfixed64` (little-endian signed 64-bit integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Sfixed64(pub i64);

impl core::ops::Deref for Sfixed64 {
    type Target = i64;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ProtoType for Sfixed64 {
    const WIRE_TYPE: WireType = WireType::I64;
}

impl ProtoDecode for Sfixed64 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let bytes: [u8; 8] = cur.read_slice(8)?.try_into().expect("exactly 8 bytes");
        *dst = Sfixed64(i64::from_le_bytes(bytes));
        Ok(())
    }
}

impl ProtoEncode for Sfixed64 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        sink.put_slice(&self.0.to_le_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        8
    }
}

impl ProtoType for f32 {
    const WIRE_TYPE: WireType = WireType::I32;
}

impl ProtoDecode for f32 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let bytes: [u8; 4] = cur.read_slice(4)?.try_into().expect("exactly 4 bytes");
        *dst = f32::from_le_bytes(bytes);
        Ok(())
    }
}

impl ProtoEncode for f32 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        sink.put_slice(&self.to_le_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        4
    }
}

impl ProtoType for f64 {
    const WIRE_TYPE: WireType = WireType::I64;
}

impl ProtoDecode for f64 {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let bytes: [u8; 8] = cur.read_slice(8)?.try_into().expect("exactly 8 bytes");
        *dst = f64::from_le_bytes(bytes);
        Ok(())
    }
}

impl ProtoEncode for f64 {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        sink.put_slice(&self.to_le_bytes());
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        8
    }
}

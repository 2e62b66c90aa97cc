//! Wire format for Google's Protocol Buffers, aka [protobuf](https://protobuf.dev),
//! with the protobuf-net-specific extensions layered on top in [`crate::codec`].

use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::util::{likely, unlikely};

/// Minimum value of a protobuf tag.
pub const MINIMUM_TAG_VAL: u32 = 1;
/// Maximum value of a protobuf tag.
pub const MAXIMUM_TAG_VAL: u32 = (1 << 29) - 1;

/// A decoded protobuf field key: a [`WireType`] and a tag (field id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoKey {
    wire_type: WireType,
    tag: u32,
}

impl ProtoKey {
    #[inline]
    fn try_from_raw(raw_key: u32) -> Result<Self, DecodeError> {
        let wire_type_raw = (raw_key & 0b111) as u8;
        let wire_type = WireType::try_from_val(wire_type_raw)?;

        let tag = raw_key >> 3;
        if unlikely(tag < MINIMUM_TAG_VAL || tag > MAXIMUM_TAG_VAL) {
            return Err(DecodeError::InvalidWireType(wire_type_raw));
        }

        Ok(Self { wire_type, tag })
    }

    #[inline]
    pub const fn wire_type(self) -> WireType {
        self.wire_type
    }

    #[inline]
    pub const fn tag(self) -> u32 {
        self.tag
    }

    #[inline]
    pub const fn into_parts(self) -> (WireType, u32) {
        (self.wire_type, self.tag)
    }
}

/// Encodes `tag`/`wire_type` as a protobuf field key.
///
/// Hot path: called once per emitted field.
#[inline]
pub fn encode_key<S: Sink>(wire_type: WireType, tag: u32, sink: &mut S) {
    let key = (tag << 3) | wire_type.into_val() as u32;
    key.encode_leb128(sink);
}

/// The encoded length of a field key (tag + wire type). The wire type
/// never changes the byte count since it only occupies the low 3 bits.
#[inline]
pub fn encoded_key_len(tag: u32) -> usize {
    (tag << 3).encoded_leb128_len()
}

/// Decodes the next field key from `cur`.
///
/// Hot path: called once per field in every message, including unknown
/// fields being skipped.
#[inline]
pub fn decode_key(cur: &mut ReadCursor) -> Result<ProtoKey, DecodeError> {
    if unlikely(cur.is_end()) {
        return Err(DecodeError::BufferOverrun);
    }
    let value = u32::decode_leb128(cur)?;
    ProtoKey::try_from_raw(value)
}

/// Decodes the length prefix of a `LEN`-wire-type field.
#[inline]
pub fn decode_len(cur: &mut ReadCursor) -> Result<usize, DecodeError> {
    let rest = cur.rest();
    if likely(!rest.is_empty() && rest[0] < 0x80) {
        let len = rest[0] as usize;
        cur.read_u8()?;
        Ok(len)
    } else {
        let len = u64::decode_leb128(cur)?;
        usize::try_from(len).map_err(|_| DecodeError::OverflowOnDecode("usize"))
    }
}

/// Skips a field's value given its wire type, used for unknown fields
/// and for the non-packed-repeated rewind loop.
#[inline]
pub fn skip_field(wire_type: WireType, cur: &mut ReadCursor) -> Result<(), DecodeError> {
    let skip_len = match wire_type {
        WireType::Varint => {
            u64::decode_leb128(cur)?;
            return Ok(());
        }
        WireType::I64 => 8,
        WireType::Len => decode_len(cur)?,
        WireType::I32 => 4,
        WireType::SGroup | WireType::EGroup => {
            return Err(DecodeError::DeprecatedGroupEncoding);
        }
    };
    cur.read_slice(skip_len)?;
    Ok(())
}

/// The wire type of an encoded protobuf field: how to interpret the
/// bytes immediately following its key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum WireType {
    /// Variable length integer: `int32`, `int64`, `uint32`, `uint64`,
    /// `sint32`, `sint64`, `bool`, `enum`.
    Varint = 0,
    /// 64-bit fixed width: `fixed64`, `sfixed64`, `double`.
    I64 = 1,
    /// Length-delimited: `string`, `bytes`, embedded messages, packed
    /// repeated fields.
    Len = 2,
    /// Group start (deprecated, skip-only).
    SGroup = 3,
    /// Group end (deprecated, skip-only).
    EGroup = 4,
    /// 32-bit fixed width: `fixed32`, `sfixed32`, `float`.
    I32 = 5,
}

impl WireType {
    #[inline]
    fn try_from_val(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::I64),
            2 => Ok(WireType::Len),
            3 => Ok(WireType::SGroup),
            4 => Ok(WireType::EGroup),
            5 => Ok(WireType::I32),
            _ => Err(DecodeError::InvalidWireType(value)),
        }
    }

    #[inline]
    pub const fn into_val(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    #[inline]
    fn try_from(value: u8) -> Result<Self, DecodeError> {
        WireType::try_from_val(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cursor::WriteCursor;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn proptest_key_roundtrips() {
        fn arb_tag() -> impl Strategy<Value = u32> {
            MINIMUM_TAG_VAL..=MAXIMUM_TAG_VAL
        }
        fn arb_wiretype() -> impl Strategy<Value = WireType> {
            (0..=5u8).prop_map(|val| WireType::try_from_val(val).expect("known valid"))
        }
        fn test(tag: u32, wire_type: WireType) {
            let mut buf = Vec::with_capacity(16);
            encode_key(wire_type, tag, &mut WriteCursor::new(&mut buf));
            let mut cur = ReadCursor::new(&buf);
            let (rnd_wire_type, rnd_tag) = decode_key(&mut cur).unwrap().into_parts();
            assert_eq!(tag, rnd_tag);
            assert_eq!(wire_type, rnd_wire_type);
        }
        proptest!(|(tag in arb_tag(), wire_type in arb_wiretype())| test(tag, wire_type));
    }

    #[test]
    fn test_decode_len() {
        let buf = [0u8];
        assert_eq!(decode_len(&mut ReadCursor::new(&buf)).unwrap(), 0);

        let buf = [127u8];
        assert_eq!(decode_len(&mut ReadCursor::new(&buf)).unwrap(), 127);

        let buf = [0x80, 0x01];
        assert_eq!(decode_len(&mut ReadCursor::new(&buf)).unwrap(), 128);

        let buf = [0xAC, 0x02];
        assert_eq!(decode_len(&mut ReadCursor::new(&buf)).unwrap(), 300);
    }

    #[test]
    fn test_skip_field_varint() {
        let buf = [42u8, 99];
        let mut cur = ReadCursor::new(&buf);
        skip_field(WireType::Varint, &mut cur).unwrap();
        assert_eq!(cur.rest(), &[99]);

        let buf = [0x80, 0x01, 99];
        let mut cur = ReadCursor::new(&buf);
        skip_field(WireType::Varint, &mut cur).unwrap();
        assert_eq!(cur.rest(), &[99]);
    }

    #[test]
    fn test_skip_field_fixed() {
        let buf = [1, 2, 3, 4, 99];
        let mut cur = ReadCursor::new(&buf);
        skip_field(WireType::I32, &mut cur).unwrap();
        assert_eq!(cur.rest(), &[99]);

        let buf = [1, 2, 3, 4, 5, 6, 7, 8, 99];
        let mut cur = ReadCursor::new(&buf);
        skip_field(WireType::I64, &mut cur).unwrap();
        assert_eq!(cur.rest(), &[99]);
    }

    #[test]
    fn test_skip_field_len() {
        let buf = [3, 1, 2, 3, 99];
        let mut cur = ReadCursor::new(&buf);
        skip_field(WireType::Len, &mut cur).unwrap();
        assert_eq!(cur.rest(), &[99]);

        let buf = [0, 99];
        let mut cur = ReadCursor::new(&buf);
        skip_field(WireType::Len, &mut cur).unwrap();
        assert_eq!(cur.rest(), &[99]);
    }

    #[test]
    fn test_skip_field_groups_error() {
        let buf = [0u8];
        assert!(skip_field(WireType::SGroup, &mut ReadCursor::new(&buf)).is_err());
        assert!(skip_field(WireType::EGroup, &mut ReadCursor::new(&buf)).is_err());
    }
}

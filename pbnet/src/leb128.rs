//! LEB128 varint encode/decode for `u32` and `u64`.
//!
//! Bounds-checked, byte-at-a-time implementations. The wire-format engine
//! is small enough, and wrong here is costly enough, that this module
//! favors an obviously-correct loop over pointer-unrolled tricks.

use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;

/// Encode/decode LEB128 varints for a fixed-width unsigned integer type.
pub trait LebCodec: Sized + Copy {
    /// Maximum number of bytes a LEB128-encoded value of this width can
    /// occupy (5 for `u32`, 10 for `u64`).
    const MAX_LEB_BYTES: usize;

    /// Reads a LEB128 varint from `cur`, advancing past the bytes
    /// consumed. Fails with [`DecodeError::MalformedVarint`] if the
    /// continuation bit is still set after `MAX_LEB_BYTES` bytes, or
    /// [`DecodeError::BufferOverrun`] if the input runs out first.
    fn decode_leb128(cur: &mut ReadCursor) -> Result<Self, DecodeError>;

    /// Writes `self` as a minimum-length LEB128 varint (never a trailing
    /// zero continuation byte).
    fn encode_leb128<S: Sink>(self, sink: &mut S);

    /// The exact number of bytes [`LebCodec::encode_leb128`] would emit.
    fn encoded_leb128_len(self) -> usize;
}

macro_rules! impl_leb_codec {
    ($ty:ty, $max_bytes:expr) => {
        impl LebCodec for $ty {
            const MAX_LEB_BYTES: usize = $max_bytes;

            #[inline]
            fn decode_leb128(cur: &mut ReadCursor) -> Result<Self, DecodeError> {
                let mut result: $ty = 0;
                let mut shift: u32 = 0;
                for _ in 0..Self::MAX_LEB_BYTES {
                    let byte = cur.read_u8()?;
                    if shift < <$ty>::BITS {
                        result |= ((byte & 0x7F) as $ty) << shift;
                    }
                    if byte & 0x80 == 0 {
                        return Ok(result);
                    }
                    shift += 7;
                }
                Err(DecodeError::MalformedVarint)
            }

            #[inline]
            fn encode_leb128<S: Sink>(self, sink: &mut S) {
                let mut value = self;
                loop {
                    let byte = (value & 0x7F) as u8;
                    value >>= 7;
                    if value == 0 {
                        sink.put_u8(byte);
                        break;
                    } else {
                        sink.put_u8(byte | 0x80);
                    }
                }
            }

            #[inline]
            fn encoded_leb128_len(self) -> usize {
                // ceil(bitlen(x) / 7), with 1 byte for zero.
                let bits = <$ty>::BITS - self.leading_zeros();
                core::cmp::max(1, bits.div_ceil(7) as usize)
            }
        }
    };
}

impl_leb_codec!(u32, 5);
impl_leb_codec!(u64, 10);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip<T: LebCodec + PartialEq + core::fmt::Debug>(value: T) {
        let mut buf = alloc::vec::Vec::new();
        value.encode_leb128(&mut Vec8(&mut buf));
        let mut cur = ReadCursor::new(&buf);
        let decoded = T::decode_leb128(&mut cur).unwrap();
        assert_eq!(value, decoded);
        assert_eq!(cur.position(), buf.len());
    }

    struct Vec8<'a>(&'a mut alloc::vec::Vec<u8>);
    impl<'a> Sink for Vec8<'a> {
        fn put_u8(&mut self, b: u8) {
            self.0.push(b);
        }
        fn put_slice(&mut self, b: &[u8]) {
            self.0.extend_from_slice(b);
        }
    }

    #[test]
    fn boundaries_u32() {
        for v in [
            0u32,
            127,
            128,
            16383,
            16384,
            2097151,
            2097152,
            (1 << 28) - 1,
            1 << 28,
            u32::MAX,
        ] {
            roundtrip(v);
        }
    }

    #[test]
    fn boundaries_u64() {
        for v in [0u64, 127, 128, (1u64 << 63) - 1, u64::MAX] {
            roundtrip(v);
        }
    }

    #[test]
    fn min_length_property() {
        // minimum-length property: byte count == max(1, ceil(bitlen(n)/7))
        fn expected_len(n: u64) -> usize {
            if n == 0 {
                1
            } else {
                core::cmp::max(1, (64 - n.leading_zeros()).div_ceil(7) as usize)
            }
        }
        proptest!(|(n: u64)| {
            prop_assert_eq!(n.encoded_leb128_len(), expected_len(n));
        });
    }

    #[test]
    fn malformed_varint_errors() {
        // 11 bytes, all with continuation bit set: too long for u64 (max 10).
        let buf = [0x80u8; 11];
        let mut cur = ReadCursor::new(&buf);
        assert_eq!(
            u64::decode_leb128(&mut cur),
            Err(DecodeError::MalformedVarint)
        );
    }

    #[test]
    fn buffer_overrun_errors() {
        let buf = [0x80u8, 0x80];
        let mut cur = ReadCursor::new(&buf);
        assert_eq!(
            u64::decode_leb128(&mut cur),
            Err(DecodeError::BufferOverrun)
        );
    }
}

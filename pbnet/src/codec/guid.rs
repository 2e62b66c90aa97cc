//! The protobuf-net "BCL GUID" encoding: a 128-bit value carried as a
//! LEN-wrapped two-field sub-message (both fields FIXED64), rather than as
//! 16 raw bytes.
//!
//! Field 1 ("low") holds the first 8 bytes of the GUID's standard .NET byte
//! layout (`Data1` little-endian, `Data2` little-endian, `Data3`
//! little-endian); field 2 ("high") holds the last 8 bytes (`Data4`,
//! carried byte-for-byte). Both are stored on the wire as little-endian
//! `fixed64`, so `Guid::to_bytes()`/`Guid::from_bytes()` round-trip the
//! standard layout exactly without any further byte shuffling — the "low"
//! and "high" halves are just the first and second 8-byte slices of it.

use super::{Fixed64, ProtoDecode, ProtoEncode, ProtoType};
use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::wire::{self, WireType};

const LOW_TAG: u32 = 1;
const HIGH_TAG: u32 = 2;

/// A 128-bit GUID in the .NET/BCL standard byte layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Guid([u8; 16]);

impl Guid {
    pub const NIL: Guid = Guid([0; 16]);

    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Builds a GUID from its `.NET`-style field decomposition:
    /// `Data1` (native-endian display form, stored little-endian),
    /// `Data2`, `Data3` likewise, and `Data4` as its 8 raw bytes.
    #[inline]
    pub fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&data1.to_le_bytes());
        bytes[4..6].copy_from_slice(&data2.to_le_bytes());
        bytes[6..8].copy_from_slice(&data3.to_le_bytes());
        bytes[8..16].copy_from_slice(&data4);
        Self(bytes)
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.0 == [0; 16]
    }

    #[inline]
    fn low(&self) -> Fixed64 {
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[0..8]);
        Fixed64(u64::from_le_bytes(low))
    }

    #[inline]
    fn high(&self) -> Fixed64 {
        let mut high = [0u8; 8];
        high.copy_from_slice(&self.0[8..16]);
        Fixed64(u64::from_le_bytes(high))
    }
}

impl ProtoType for Guid {
    const WIRE_TYPE: WireType = WireType::Len;
}

impl ProtoEncode for Guid {
    fn encode<S: Sink>(&self, sink: &mut S) {
        wire::encode_key(WireType::I64, LOW_TAG, sink);
        self.low().encode(sink);
        wire::encode_key(WireType::I64, HIGH_TAG, sink);
        self.high().encode(sink);
    }

    fn encoded_len(&self) -> usize {
        wire::encoded_key_len(LOW_TAG) + 8 + wire::encoded_key_len(HIGH_TAG) + 8
    }
}

impl ProtoDecode for Guid {
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];

        while !cur.is_end() {
            let key = wire::decode_key(cur)?;
            match key.tag() {
                LOW_TAG => {
                    let mut v = Fixed64::default();
                    Fixed64::decode_into(cur, &mut v)?;
                    low = v.0.to_le_bytes();
                }
                HIGH_TAG => {
                    let mut v = Fixed64::default();
                    Fixed64::decode_into(cur, &mut v)?;
                    high = v.0.to_le_bytes();
                }
                _ => cur.skip_field(key.wire_type())?,
            }
        }

        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&low);
        bytes[8..16].copy_from_slice(&high);
        *dst = Guid(bytes);
        Ok(())
    }
}

//! Repeated field encode/decode: packed and non-packed.
//!
//! Non-packed repeated fields are a sequence of `<key><value>` pairs,
//! possibly interleaved with other fields — so decode always
//! goes one field at a time, driven by the generated match on tag, same
//! as any other field. Packed repeated fields (scalars only) are a
//! single `<key><len><value><value>...>` with no keys between elements.
//!
//! [`decode_repeated_field`] accepts either wire form for a given element
//! regardless of which one the writer chose, per protobuf's packed/
//! unpacked forward-compatibility rule.

use alloc::vec::Vec;

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::{self, WireType};

fn fixed_element_size(wire_type: WireType) -> Option<u8> {
    match wire_type {
        WireType::I32 => Some(4),
        WireType::I64 => Some(8),
        _ => None,
    }
}

/// Decodes one occurrence of a repeated field at `cur` (positioned just
/// past the key) into `dst`, handling both packed and non-packed wire
/// forms.
#[inline]
pub fn decode_repeated_field<T: ProtoType + ProtoDecode>(
    cur: &mut ReadCursor,
    wire_type: WireType,
    dst: &mut Vec<T>,
) -> Result<(), DecodeError> {
    if wire_type == WireType::Len && T::WIRE_TYPE != WireType::Len {
        let mut inner = cur.read_length_prefixed()?;
        if let Some(element_size) = fixed_element_size(T::WIRE_TYPE) {
            let actual = inner.remaining();
            if actual % element_size as usize != 0 {
                return Err(DecodeError::InvalidPackedLength {
                    element_size,
                    actual: actual as u32,
                });
            }
        }
        while !inner.is_end() {
            let mut value = T::default();
            T::decode_into(&mut inner, &mut value)?;
            dst.push(value);
        }
        Ok(())
    } else {
        let mut value = T::default();
        T::decode_into(cur, &mut value)?;
        dst.push(value);
        Ok(())
    }
}

/// Writes `values` as a non-packed repeated field: one `<key><value>` per
/// element.
#[inline]
pub fn encode_repeated_field<T: ProtoType + ProtoEncode, S: Sink>(tag: u32, values: &[T], sink: &mut S) {
    for value in values {
        wire::encode_key(T::WIRE_TYPE, tag, sink);
        value.encode(sink);
    }
}

#[inline]
pub fn encoded_repeated_field_len<T: ProtoType + ProtoEncode>(tag: u32, values: &[T]) -> usize {
    if values.is_empty() {
        return 0;
    }
    let key_len = wire::encoded_key_len(tag);
    values.iter().map(|v| key_len + v.encoded_len()).sum()
}

/// Writes `values` as a packed repeated field: one key, one length, then
/// all element bytes concatenated. Omitted entirely when `values` is
/// empty.
#[inline]
pub fn encode_packed_field<T: ProtoEncode, S: Sink>(tag: u32, values: &[T], sink: &mut S) {
    if values.is_empty() {
        return;
    }
    wire::encode_key(WireType::Len, tag, sink);
    let body_len: usize = values.iter().map(|v| v.encoded_len()).sum();
    (body_len as u64).encode_leb128(sink);
    for value in values {
        value.encode(sink);
    }
}

#[inline]
pub fn encoded_packed_field_len<T: ProtoEncode>(tag: u32, values: &[T]) -> usize {
    if values.is_empty() {
        return 0;
    }
    let body_len: usize = values.iter().map(|v| v.encoded_len()).sum();
    wire::encoded_key_len(tag) + (body_len as u64).encoded_leb128_len() + body_len
}

//! Wrapper type support for protobuf (e.g. Option, Box).

#[cfg(feature = "alloc")]
use alloc::boxed::Box;

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::wire::WireType;

impl<T: ProtoType> ProtoType for Option<T> {
    const WIRE_TYPE: WireType = T::WIRE_TYPE;
}

impl<T: ProtoDecode> ProtoDecode for Option<T> {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        let mut value = T::default();
        T::decode_into(cur, &mut value)?;
        *dst = Some(value);
        Ok(())
    }
}

impl<T: ProtoEncode> ProtoEncode for Option<T> {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        if let Some(value) = self {
            value.encode(sink);
        }
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        match self {
            Some(value) => value.encoded_len(),
            None => 0,
        }
    }
}

// Box<T> implementations - allows heap allocation for recursive or large types.

#[cfg(feature = "alloc")]
impl<T: ProtoType> ProtoType for Box<T> {
    const WIRE_TYPE: WireType = T::WIRE_TYPE;
}

#[cfg(feature = "alloc")]
impl<T: ProtoDecode> ProtoDecode for Box<T> {
    #[inline]
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
        T::decode_into(cur, dst.as_mut())
    }
}

#[cfg(feature = "alloc")]
impl<T: ProtoEncode> ProtoEncode for Box<T> {
    #[inline]
    fn encode<S: Sink>(&self, sink: &mut S) {
        self.as_ref().encode(sink);
    }

    #[inline]
    fn encoded_len(&self) -> usize {
        self.as_ref().encoded_len()
    }
}

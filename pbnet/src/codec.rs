//! Per-wire-type encode/decode building blocks.
//!
//! Everything in this module is written against [`crate::cursor::Sink`] and
//! [`crate::cursor::ReadCursor`] rather than raw byte slices, so the same
//! `encode` call drives both a real [`crate::cursor::WriteCursor`] and a
//! counting-only [`crate::cursor::SizeCursor`] — see [`ProtoEncode::encoded_len`].

mod default_check;
#[cfg(feature = "alloc")]
mod delimited;
pub mod guid;
#[cfg(feature = "alloc")]
mod map;
#[cfg(feature = "alloc")]
pub mod message;
mod oneof;
#[cfg(feature = "alloc")]
mod repeated;
mod scalar;
mod wrappers;

use crate::cursor::{ReadCursor, Sink, SizeCursor};
use crate::error::DecodeError;
use crate::wire::WireType;

/// A protobuf scalar or length-delimited value with a fixed wire type.
pub trait ProtoType: Sized {
    /// The wire type this value is decoded/encoded with.
    const WIRE_TYPE: WireType;
}

/// A type that can be encoded to protobuf wire format.
pub trait ProtoEncode: ProtoType {
    /// Writes this value's bytes (not including the field key) to `sink`.
    fn encode<S: Sink>(&self, sink: &mut S);

    /// The encoded length of this value, not including the field key.
    ///
    /// The default implementation runs [`ProtoEncode::encode`] against a
    /// [`SizeCursor`], so overriding it is purely an optimization — the
    /// overridden and default forms can never disagree on byte count.
    #[inline]
    fn encoded_len(&self) -> usize {
        let mut counter = SizeCursor::new();
        self.encode(&mut counter);
        counter.len()
    }
}

/// A type that can be decoded from protobuf wire format.
pub trait ProtoDecode: ProtoType + Default {
    /// Decodes a value from `cur`, which is positioned just past the field
    /// key, replacing `dst` outright — the last occurrence of a field on
    /// the wire wins, whether it's a scalar or an embedded message.
    fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError>;
}

pub use default_check::IsProtoDefault;
#[cfg(feature = "alloc")]
pub use delimited::{ProtoBytes, ProtoString};
pub use guid::Guid;
#[cfg(feature = "alloc")]
pub use map::{ProtoMap, ProtoMapKey};
#[cfg(feature = "alloc")]
pub use message::{
    capture_unknown_field, decode_message_field, encode_message_field, encoded_message_field_len,
    LazyMessage, ProtoMessage,
};
pub use oneof::{decode_oneof_field, encode_oneof_field, encoded_oneof_field_len, ProtoOneof};
#[cfg(feature = "alloc")]
pub use repeated::{
    decode_repeated_field, encode_packed_field, encode_repeated_field, encoded_packed_field_len,
    encoded_repeated_field_len,
};
pub use scalar::{Fixed32, Fixed64, Sfixed32, Sfixed64, Sint32, Sint64};

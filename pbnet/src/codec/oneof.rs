//! Oneof field support for protobuf.
//!
//! Protobuf oneofs map naturally to Rust enums. Oneofs have no wire
//! representation of their own: each variant is encoded as a regular
//! field with its own tag, mutual exclusivity enforced at the Rust type
//! level, "last one wins" on decode if more than one variant's tag
//! appears.
//!
//! ```ignore
//! #[derive(ProtoOneof)]
//! pub enum Widget {
//!     #[proto(tag = 1)]
//!     Quux(i32),
//!     #[proto(tag = 2)]
//!     Bar(ProtoString),
//! }
//!
//! pub struct Foo {
//!     pub widget: Option<Widget>,
//! }
//! ```

use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::wire::WireType;

/// Implemented by every `#[derive(ProtoOneof)]` enum.
pub trait ProtoOneof: Sized {
    /// Attempts to decode one variant from `(tag, wire_type)`, with `cur`
    /// positioned at the value (just past the key).
    ///
    /// `Ok(None)` means `tag` isn't one of this oneof's variants; the
    /// caller should treat it as an unrecognized field.
    fn decode_variant(tag: u32, wire_type: WireType, cur: &mut ReadCursor) -> Result<Option<Self>, DecodeError>;

    /// Writes the full field (key and value) for the active variant.
    fn encode_variant<S: Sink>(&self, sink: &mut S);

    /// The encoded length of the active variant, including its field key.
    fn encoded_variant_len(&self) -> usize;

    fn variant_tag(&self) -> u32;

    fn variant_wire_type(&self) -> WireType;
}

/// Decodes into an `Option<T>` oneof field, replacing any prior value
/// ("last one wins").
#[inline]
pub fn decode_oneof_field<T: ProtoOneof>(
    dst: &mut Option<T>,
    tag: u32,
    wire_type: WireType,
    cur: &mut ReadCursor,
) -> Result<bool, DecodeError> {
    match T::decode_variant(tag, wire_type, cur)? {
        Some(value) => {
            *dst = Some(value);
            Ok(true)
        }
        None => Ok(false),
    }
}

#[inline]
pub fn encode_oneof_field<T: ProtoOneof, S: Sink>(field: &Option<T>, sink: &mut S) {
    if let Some(ref value) = field {
        value.encode_variant(sink);
    }
}

#[inline]
pub fn encoded_oneof_field_len<T: ProtoOneof>(field: &Option<T>) -> usize {
    match field {
        Some(value) => value.encoded_variant_len(),
        None => 0,
    }
}

//! A Protocol Buffers codec wire-compatible with the "protobuf-net" dialect.
//!
//! This crate provides the wire-format engine (varint/zigzag/fixed
//! primitives, packed/non-packed repeated fields, BCL-GUID encoding, and
//! nested-wrapper polymorphism) and the cursor abstractions it runs over.
//! Per-contract `read`/`write`/`size` procedures are generated by
//! `#[derive(ProtoMessage)]`, `#[derive(ProtoOneof)]`, and
//! `#[derive(ProtoPoly)]` from the `derive` feature (see [`pbnet_derive`]).

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod codec;
pub mod cursor;
pub mod error;
pub mod leb128;
mod util;
pub mod wire;

#[cfg(feature = "derive")]
pub use pbnet_derive::{ProtoMessage, ProtoOneof, ProtoPoly};

pub use codec::guid::Guid;
#[cfg(feature = "alloc")]
pub use codec::message::ProtoMessage;
pub use cursor::{ReadCursor, SizeCursor};
#[cfg(feature = "alloc")]
pub use cursor::WriteCursor;
pub use error::DecodeError;

/// Serializes `value` to a freshly allocated byte buffer.
///
/// The content length is computed once up front and used to pre-allocate
/// the output buffer so [`ProtoMessage::encode_content`] itself never
/// reallocates.
#[cfg(feature = "alloc")]
pub fn serialize<T: ProtoMessage>(value: &T) -> alloc::vec::Vec<u8> {
    let len = value.encoded_content_len();
    let mut out = alloc::vec::Vec::with_capacity(len);
    let mut cur = WriteCursor::new(&mut out);
    value.encode_content(&mut cur);
    out
}

/// Deserializes a `T` from `bytes`, reading until the end of the buffer.
///
/// Trailing or unknown field ids are skipped by their wire type per the
/// forward-compatibility rule; see [`error::DecodeError`] for the failure
/// taxonomy.
#[cfg(feature = "alloc")]
pub fn deserialize<T: ProtoMessage>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut cur = ReadCursor::new(bytes);
    T::decode_content(&mut cur)
}

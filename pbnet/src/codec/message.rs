//! The core message contract and helpers for embedding one message inside
//! another as a length-delimited field.
//!
//! A generated `#[derive(ProtoMessage)]` implementation splits into two
//! layers:
//!
//! - `encode_own`/`decode_own_field`/`encoded_own_len` cover exactly the
//!   fields declared on *this* struct, excluding an embedded
//!   `#[proto(base)]` parent field, if any.
//! - `encode_content`/`decode_content`/`encoded_content_len` are the full
//!   message body: own fields plus, recursively, the base's own fields,
//!   with no nested-wrapper framing between them (protobuf-net's
//!   inheritance-by-flattening — contrast with [`crate::codec::guid`] and
//!   the `ProtoPoly`-generated *nested*-wrapper scheme used for the
//!   downcast direction).
//!
//! Leaf contracts with no base field get `encode_content`/`decode_content`
//! for free from the trait's default methods, which just delegate to
//! `encode_own`/`decode_own_field`.

use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::{self, WireType};

/// Implemented by every `#[derive(ProtoMessage)]` contract.
pub trait ProtoMessage: Sized + Default {
    /// Writes this struct's own fields (excluding its base, if any).
    fn encode_own<S: Sink>(&self, sink: &mut S);

    /// The encoded length of this struct's own fields.
    fn encoded_own_len(&self) -> usize;

    /// Attempts to decode a single field with wire key `(tag, wire_type)`
    /// as one of this struct's own fields, writing the decoded value into
    /// `dst`. A repeated field pushes; any other field replaces the prior
    /// value outright (last one wins on a duplicate tag, not a recursive
    /// merge of an embedded message's own fields).
    ///
    /// Returns `Ok(true)` if `tag` belongs to this struct and was
    /// consumed, `Ok(false)` if it's not recognized (the caller should
    /// then try the base contract, or skip it as unknown).
    fn decode_own_field(
        cur: &mut ReadCursor,
        tag: u32,
        wire_type: WireType,
        dst: &mut Self,
    ) -> Result<bool, DecodeError>;

    /// Writes the full message body: own fields, then (for a contract with
    /// a `#[proto(base)]` field) the base's full content, recursively.
    #[inline]
    fn encode_content<S: Sink>(&self, sink: &mut S) {
        self.encode_own(sink);
    }

    /// The encoded length of the full message body.
    #[inline]
    fn encoded_content_len(&self) -> usize {
        self.encoded_own_len()
    }

    /// Attempts to decode one field as one of this contract's own fields
    /// or, recursively, one of an embedded base's own fields. A contract
    /// with a `#[proto(base)]` field overrides this to fall through to
    /// `BaseTy::decode_inherited_field`; the default just tries
    /// [`ProtoMessage::decode_own_field`], which is already correct for a
    /// contract with no base.
    #[inline]
    fn decode_inherited_field(
        cur: &mut ReadCursor,
        tag: u32,
        wire_type: WireType,
        dst: &mut Self,
    ) -> Result<bool, DecodeError> {
        Self::decode_own_field(cur, tag, wire_type, dst)
    }

    /// Decodes a full message body (no length prefix; consumes `cur` to
    /// its end), trying own fields first, then (through
    /// [`ProtoMessage::decode_inherited_field`]) the base contract at any
    /// depth, for anything unrecognized.
    #[inline]
    fn decode_content(cur: &mut ReadCursor) -> Result<Self, DecodeError> {
        let mut dst = Self::default();
        while !cur.is_end() {
            let key = wire::decode_key(cur)?;
            if Self::decode_inherited_field(cur, key.tag(), key.wire_type(), &mut dst)? {
                continue;
            }
            cur.skip_field(key.wire_type())?;
        }
        Ok(dst)
    }
}

/// Re-emits an unrecognized field's key and exact wire bytes (unknown-field
/// preservation), advancing `cur` past the value.
#[inline]
pub fn capture_unknown_field<S: Sink>(
    tag: u32,
    wire_type: WireType,
    cur: &mut ReadCursor,
    sink: &mut S,
) -> Result<(), DecodeError> {
    wire::encode_key(wire_type, tag, sink);
    let start = cur.save();
    cur.skip_field(wire_type)?;
    sink.put_slice(cur.consumed_since(start));
    Ok(())
}

/// Decodes a nested message from a `LEN`-delimited field (key already
/// consumed).
#[inline]
pub fn decode_message_field<T: ProtoMessage>(cur: &mut ReadCursor) -> Result<T, DecodeError> {
    let mut inner = cur.read_length_prefixed()?;
    T::decode_content(&mut inner)
}

/// Writes `msg` as a `LEN`-delimited field: a varint length prefix
/// followed by its content.
#[inline]
pub fn encode_message_field<T: ProtoMessage, S: Sink>(msg: &T, sink: &mut S) {
    let len = msg.encoded_content_len();
    (len as u64).encode_leb128(sink);
    msg.encode_content(sink);
}

/// The encoded length of `msg` as a `LEN`-delimited field, including the
/// length prefix itself.
#[inline]
pub fn encoded_message_field_len<T: ProtoMessage>(msg: &T) -> usize {
    let len = msg.encoded_content_len();
    (len as u64).encoded_leb128_len() + len
}

/// Deferred-decode wrapper for a nested message field.
///
/// Stores the raw message bytes (without length prefix) and parses on
/// demand, so a decoder that only cares about a handful of a large
/// message's fields can skip the cost of parsing uninteresting nested
/// messages entirely.
#[derive(Clone)]
pub struct LazyMessage<T> {
    buf: alloc::vec::Vec<u8>,
    _marker: core::marker::PhantomData<T>,
}

impl<T> LazyMessage<T> {
    pub fn new(buf: alloc::vec::Vec<u8>) -> Self {
        Self {
            buf,
            _marker: core::marker::PhantomData,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> alloc::vec::Vec<u8> {
        self.buf
    }
}

impl<T: ProtoMessage> LazyMessage<T> {
    /// Decodes the message. May be called more than once.
    pub fn decode(&self) -> Result<T, DecodeError> {
        T::decode_content(&mut ReadCursor::new(&self.buf))
    }
}

impl<T> Default for LazyMessage<T> {
    fn default() -> Self {
        Self::new(alloc::vec::Vec::new())
    }
}

impl<T> core::fmt::Debug for LazyMessage<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyMessage").field("len", &self.buf.len()).finish()
    }
}

/// Skips a `LEN`-delimited field (key already consumed) and returns its
/// bytes, without decoding them. Used to stash a nested message's bytes
/// for a [`LazyMessage`].
#[inline]
pub fn skip_len_field(cur: &mut ReadCursor) -> Result<alloc::vec::Vec<u8>, DecodeError> {
    Ok(cur.read_length_prefixed()?.rest().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::{ProtoDecode, ProtoEncode, ProtoString};
    use crate::cursor::WriteCursor;
    use crate::wire::{encode_key, WireType};
    use alloc::vec::Vec;

    /// `message PhoneNumber { string number = 1; int32 type = 2; }`
    #[derive(Debug, Clone, PartialEq, Default)]
    struct PhoneNumber {
        number: ProtoString,
        phone_type: i32,
    }

    impl ProtoMessage for PhoneNumber {
        fn encode_own<S: Sink>(&self, sink: &mut S) {
            if !self.number.is_empty() {
                encode_key(WireType::Len, 1, sink);
                self.number.encode(sink);
            }
            if self.phone_type != 0 {
                encode_key(WireType::Varint, 2, sink);
                self.phone_type.encode(sink);
            }
        }

        fn encoded_own_len(&self) -> usize {
            let mut len = 0;
            if !self.number.is_empty() {
                len += wire::encoded_key_len(1) + self.number.encoded_len();
            }
            if self.phone_type != 0 {
                len += wire::encoded_key_len(2) + self.phone_type.encoded_len();
            }
            len
        }

        fn decode_own_field(
            cur: &mut ReadCursor,
            tag: u32,
            _wire_type: WireType,
            dst: &mut Self,
        ) -> Result<bool, DecodeError> {
            match tag {
                1 => {
                    ProtoString::decode_into(cur, &mut dst.number)?;
                    Ok(true)
                }
                2 => {
                    i32::decode_into(cur, &mut dst.phone_type)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    /// `message Person { string name = 1; PhoneNumber phone = 2; }`
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Person {
        name: ProtoString,
        phone: Option<PhoneNumber>,
    }

    impl ProtoMessage for Person {
        fn encode_own<S: Sink>(&self, sink: &mut S) {
            if !self.name.is_empty() {
                encode_key(WireType::Len, 1, sink);
                self.name.encode(sink);
            }
            if let Some(ref phone) = self.phone {
                encode_key(WireType::Len, 2, sink);
                encode_message_field(phone, sink);
            }
        }

        fn encoded_own_len(&self) -> usize {
            let mut len = 0;
            if !self.name.is_empty() {
                len += wire::encoded_key_len(1) + self.name.encoded_len();
            }
            if let Some(ref phone) = self.phone {
                len += wire::encoded_key_len(2) + encoded_message_field_len(phone);
            }
            len
        }

        fn decode_own_field(
            cur: &mut ReadCursor,
            tag: u32,
            _wire_type: WireType,
            dst: &mut Self,
        ) -> Result<bool, DecodeError> {
            match tag {
                1 => {
                    ProtoString::decode_into(cur, &mut dst.name)?;
                    Ok(true)
                }
                2 => {
                    dst.phone = Some(decode_message_field(cur)?);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    #[test]
    fn test_nested_message_roundtrip() {
        let phone = PhoneNumber {
            number: ProtoString::from("555-1234"),
            phone_type: 1,
        };
        let person = Person {
            name: ProtoString::from("Alice"),
            phone: Some(phone),
        };

        let mut buf = Vec::new();
        person.encode_content(&mut WriteCursor::new(&mut buf));
        assert_eq!(buf.len(), person.encoded_content_len());

        let decoded = Person::decode_content(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(&*decoded.name, "Alice");
        let decoded_phone = decoded.phone.as_ref().unwrap();
        assert_eq!(&*decoded_phone.number, "555-1234");
        assert_eq!(decoded_phone.phone_type, 1);
    }

    #[test]
    fn test_nested_message_as_field() {
        let phone = PhoneNumber {
            number: ProtoString::from("555-1234"),
            phone_type: 2,
        };

        let mut buf = Vec::new();
        encode_message_field(&phone, &mut WriteCursor::new(&mut buf));

        let decoded: PhoneNumber = decode_message_field(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(&*decoded.number, "555-1234");
        assert_eq!(decoded.phone_type, 2);
    }

    /// Deferred-decode nested message via `LazyMessage`.
    #[derive(Debug, Clone, Default)]
    struct PersonLazy {
        name: ProtoString,
        phone: Option<LazyMessage<PhoneNumber>>,
    }

    impl PersonLazy {
        fn decode(cur: &mut ReadCursor) -> Result<Self, DecodeError> {
            let mut dst = PersonLazy::default();
            while !cur.is_end() {
                let key = wire::decode_key(cur)?;
                match key.tag() {
                    1 => ProtoString::decode_into(cur, &mut dst.name)?,
                    2 => dst.phone = Some(LazyMessage::new(skip_len_field(cur)?)),
                    _ => cur.skip_field(key.wire_type())?,
                }
            }
            Ok(dst)
        }

        fn phone(&self) -> Option<Result<PhoneNumber, DecodeError>> {
            self.phone.as_ref().map(|lazy| lazy.decode())
        }
    }

    #[test]
    fn test_lazy_nested_message() {
        let phone = PhoneNumber {
            number: ProtoString::from("555-1234"),
            phone_type: 1,
        };
        let person = Person {
            name: ProtoString::from("Bob"),
            phone: Some(phone),
        };

        let mut buf = Vec::new();
        person.encode_content(&mut WriteCursor::new(&mut buf));

        let lazy_person = PersonLazy::decode(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(&*lazy_person.name, "Bob");

        let decoded_phone = lazy_person.phone().unwrap().unwrap();
        assert_eq!(&*decoded_phone.number, "555-1234");
        assert_eq!(decoded_phone.phone_type, 1);

        let decoded_phone2 = lazy_person.phone().unwrap().unwrap();
        assert_eq!(&*decoded_phone2.number, "555-1234");
    }

    /// `message Animal { string name = 1; }`
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Animal {
        name: ProtoString,
    }

    impl ProtoMessage for Animal {
        fn encode_own<S: Sink>(&self, sink: &mut S) {
            if !self.name.is_empty() {
                encode_key(WireType::Len, 1, sink);
                self.name.encode(sink);
            }
        }

        fn encoded_own_len(&self) -> usize {
            if self.name.is_empty() {
                0
            } else {
                wire::encoded_key_len(1) + self.name.encoded_len()
            }
        }

        fn decode_own_field(
            cur: &mut ReadCursor,
            tag: u32,
            _wire_type: WireType,
            dst: &mut Self,
        ) -> Result<bool, DecodeError> {
            match tag {
                1 => {
                    ProtoString::decode_into(cur, &mut dst.name)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }

    /// `message Dog : Animal { int32 bark_volume = 2; }` — inheritance by
    /// flattening: `base` has no wrapper, its fields are interleaved with
    /// `Dog`'s own on the wire.
    #[derive(Debug, Clone, PartialEq, Default)]
    struct Dog {
        base: Animal,
        bark_volume: i32,
    }

    impl ProtoMessage for Dog {
        fn encode_own<S: Sink>(&self, sink: &mut S) {
            if self.bark_volume != 0 {
                encode_key(WireType::Varint, 2, sink);
                self.bark_volume.encode(sink);
            }
        }

        fn encoded_own_len(&self) -> usize {
            if self.bark_volume == 0 {
                0
            } else {
                wire::encoded_key_len(2) + self.bark_volume.encoded_len()
            }
        }

        fn decode_own_field(
            cur: &mut ReadCursor,
            tag: u32,
            _wire_type: WireType,
            dst: &mut Self,
        ) -> Result<bool, DecodeError> {
            match tag {
                2 => {
                    i32::decode_into(cur, &mut dst.bark_volume)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        fn encode_content<S: Sink>(&self, sink: &mut S) {
            self.encode_own(sink);
            self.base.encode_content(sink);
        }

        fn encoded_content_len(&self) -> usize {
            self.encoded_own_len() + self.base.encoded_content_len()
        }

        fn decode_inherited_field(
            cur: &mut ReadCursor,
            tag: u32,
            wire_type: WireType,
            dst: &mut Self,
        ) -> Result<bool, DecodeError> {
            if Self::decode_own_field(cur, tag, wire_type, dst)? {
                return Ok(true);
            }
            Animal::decode_inherited_field(cur, tag, wire_type, &mut dst.base)
        }
    }

    #[test]
    fn test_flattened_inheritance_roundtrip() {
        let dog = Dog {
            base: Animal {
                name: ProtoString::from("Rex"),
            },
            bark_volume: 11,
        };

        let mut buf = Vec::new();
        dog.encode_content(&mut WriteCursor::new(&mut buf));
        assert_eq!(buf.len(), dog.encoded_content_len());

        // No nested-message wrapper: the base's field tag appears directly
        // in the same stream as Dog's own.
        let decoded = Dog::decode_content(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(decoded, dog);
    }

    #[test]
    fn test_capture_unknown_field_preserves_bytes() {
        use crate::wire::decode_key;

        let mut original = Vec::new();
        encode_key(WireType::Varint, 77, &mut WriteCursor::new(&mut original));
        300u64.encode(&mut WriteCursor::new(&mut original));

        let mut cur = ReadCursor::new(&original);
        let key = decode_key(&mut cur).unwrap();

        let mut captured = Vec::new();
        capture_unknown_field(key.tag(), key.wire_type(), &mut cur, &mut WriteCursor::new(&mut captured)).unwrap();

        assert_eq!(captured, original);
    }
}

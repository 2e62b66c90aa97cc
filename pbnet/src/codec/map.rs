//! Protobuf map field support.
//!
//! Maps are sugar for `repeated Entry { K key = 1; V value = 2; }`: each
//! entry is its own length-delimited record with two fields, and the map
//! field itself is simply a repeated field of those entries — there's no
//! single "the map" on the wire, just however many entries happen to
//! appear (possibly interleaved with other fields, last-key-wins on
//! duplicates).
//!
//! Valid key types per protobuf: integral types, bool, string. Not
//! valid: float, double, bytes, enum, message.
//!
//! ```ignore
//! use alloc::collections::BTreeMap;
//! use pbnet::ProtoMessage;
//!
//! #[derive(Default, ProtoMessage)]
//! pub struct Config {
//!     #[proto(tag = 1, map)]
//!     pub settings: BTreeMap<alloc::string::String, alloc::string::String>,
//! }
//! ```

use alloc::collections::BTreeMap;
use alloc::string::String;

#[cfg(feature = "std")]
use core::hash::Hash;
#[cfg(feature = "std")]
use std::collections::HashMap;

use super::{ProtoDecode, ProtoEncode, ProtoType};
use crate::cursor::{ReadCursor, Sink};
use crate::error::DecodeError;
use crate::leb128::LebCodec;
use crate::wire::{self, WireType};

/// Marker trait for types usable as protobuf map keys.
pub trait ProtoMapKey: ProtoType + ProtoDecode + ProtoEncode + Clone {}

impl ProtoMapKey for i32 {}
impl ProtoMapKey for i64 {}
impl ProtoMapKey for u32 {}
impl ProtoMapKey for u64 {}
impl ProtoMapKey for bool {}
impl ProtoMapKey for super::Sint32 {}
impl ProtoMapKey for super::Sint64 {}
impl ProtoMapKey for super::Fixed32 {}
impl ProtoMapKey for super::Fixed64 {}
impl ProtoMapKey for super::Sfixed32 {}
impl ProtoMapKey for super::Sfixed64 {}
impl ProtoMapKey for super::ProtoString {}
impl ProtoMapKey for String {}

/// Implemented by `BTreeMap<K, V>` and (with `std`) `HashMap<K, V>` map
/// fields, giving the derive macro a uniform entry point regardless of
/// the concrete container.
pub trait ProtoMap: Default {
    /// Decodes one entry (key already consumed; `cur` positioned at the
    /// entry's length prefix) and inserts it, overwriting on duplicate
    /// keys.
    fn decode_entry(&mut self, cur: &mut ReadCursor) -> Result<(), DecodeError>;

    /// Writes all entries, each with its own field key.
    fn encode_map<S: Sink>(&self, tag: u32, sink: &mut S);

    /// The encoded length of all entries, including field keys. Zero for
    /// an empty map.
    fn encoded_map_len(&self, tag: u32) -> usize;

    fn map_len(&self) -> usize;

    fn is_map_empty(&self) -> bool {
        self.map_len() == 0
    }
}

fn decode_map_entry<K, V>(cur: &mut ReadCursor) -> Result<(K, V), DecodeError>
where
    K: ProtoMapKey + Default,
    V: ProtoType + ProtoDecode + Default,
{
    let mut entry = cur.read_length_prefixed()?;
    let mut key = K::default();
    let mut value = V::default();

    while !entry.is_end() {
        let field_key = wire::decode_key(&mut entry)?;
        match field_key.tag() {
            1 => {
                if field_key.wire_type() != K::WIRE_TYPE {
                    return Err(DecodeError::InvalidWireType(field_key.wire_type().into_val()));
                }
                K::decode_into(&mut entry, &mut key)?;
            }
            2 => {
                if field_key.wire_type() != V::WIRE_TYPE {
                    return Err(DecodeError::InvalidWireType(field_key.wire_type().into_val()));
                }
                V::decode_into(&mut entry, &mut value)?;
            }
            _ => entry.skip_field(field_key.wire_type())?,
        }
    }

    // Per proto3, a missing key or value field uses the type's default.
    Ok((key, value))
}

fn encode_map_entry<K, V, S>(key: &K, value: &V, sink: &mut S)
where
    K: ProtoMapKey,
    V: ProtoType + ProtoEncode,
    S: Sink,
{
    let entry_len = encoded_map_entry_content_len(key, value);
    (entry_len as u64).encode_leb128(sink);

    wire::encode_key(K::WIRE_TYPE, 1, sink);
    key.encode(sink);
    wire::encode_key(V::WIRE_TYPE, 2, sink);
    value.encode(sink);
}

fn encoded_map_entry_content_len<K, V>(key: &K, value: &V) -> usize
where
    K: ProtoMapKey,
    V: ProtoType + ProtoEncode,
{
    (wire::encoded_key_len(1) + key.encoded_len()) + (wire::encoded_key_len(2) + value.encoded_len())
}

fn encoded_map_entry_len<K, V>(key: &K, value: &V) -> usize
where
    K: ProtoMapKey,
    V: ProtoType + ProtoEncode,
{
    let entry_len = encoded_map_entry_content_len(key, value);
    (entry_len as u64).encoded_leb128_len() + entry_len
}

macro_rules! impl_proto_map {
    ($container:ident $(, $bound:path)* ) => {
        impl<K, V> ProtoType for $container<K, V>
        where
            K: ProtoMapKey,
            V: ProtoType,
        {
            const WIRE_TYPE: WireType = WireType::Len;
        }

        impl<K, V> ProtoDecode for $container<K, V>
        where
            K: ProtoMapKey + Default $(+ $bound)*,
            V: ProtoType + ProtoDecode + Default,
        {
            #[inline]
            fn decode_into(cur: &mut ReadCursor, dst: &mut Self) -> Result<(), DecodeError> {
                let (key, value) = decode_map_entry::<K, V>(cur)?;
                dst.insert(key, value);
                Ok(())
            }
        }

        impl<K, V> ProtoEncode for $container<K, V>
        where
            K: ProtoMapKey,
            V: ProtoType + ProtoEncode,
        {
            fn encode<S: Sink>(&self, sink: &mut S) {
                for (key, value) in self {
                    encode_map_entry(key, value, sink);
                }
            }

            fn encoded_len(&self) -> usize {
                self.iter().map(|(k, v)| encoded_map_entry_len(k, v)).sum()
            }
        }

        impl<K, V> ProtoMap for $container<K, V>
        where
            K: ProtoMapKey + Default $(+ $bound)*,
            V: ProtoType + ProtoDecode + ProtoEncode + Default,
        {
            #[inline]
            fn decode_entry(&mut self, cur: &mut ReadCursor) -> Result<(), DecodeError> {
                let (key, value) = decode_map_entry::<K, V>(cur)?;
                self.insert(key, value);
                Ok(())
            }

            fn encode_map<S: Sink>(&self, tag: u32, sink: &mut S) {
                for (key, value) in self {
                    wire::encode_key(WireType::Len, tag, sink);
                    encode_map_entry(key, value, sink);
                }
            }

            fn encoded_map_len(&self, tag: u32) -> usize {
                if self.is_empty() {
                    return 0;
                }
                let field_key_len = wire::encoded_key_len(tag);
                self.iter()
                    .map(|(k, v)| field_key_len + encoded_map_entry_len(k, v))
                    .sum()
            }

            fn map_len(&self) -> usize {
                self.len()
            }
        }
    };
}

impl_proto_map!(BTreeMap, Ord);

#[cfg(feature = "std")]
impl_proto_map!(HashMap, Hash, Eq);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn roundtrip<K, V>(map: &BTreeMap<K, V>, tag: u32)
    where
        K: ProtoMapKey + Default + Ord + core::fmt::Debug,
        V: ProtoType + ProtoDecode + ProtoEncode + Default + PartialEq + core::fmt::Debug,
    {
        use crate::cursor::WriteCursor;

        let mut buf = Vec::new();
        map.encode_map(tag, &mut WriteCursor::new(&mut buf));
        assert_eq!(buf.len(), map.encoded_map_len(tag));

        let mut decoded: BTreeMap<K, V> = BTreeMap::new();
        let mut cur = ReadCursor::new(&buf);
        while !cur.is_end() {
            let key = wire::decode_key(&mut cur).unwrap();
            assert_eq!(key.tag(), tag);
            assert_eq!(key.wire_type(), WireType::Len);
            decoded.decode_entry(&mut cur).unwrap();
        }

        assert_eq!(map.len(), decoded.len());
        for (k, v) in map {
            assert_eq!(decoded.get(k), Some(v));
        }
    }

    #[test]
    fn test_btreemap_roundtrip_string_i32() {
        let mut map: BTreeMap<String, i32> = BTreeMap::new();
        map.insert("apple".into(), 5);
        map.insert("banana".into(), 3);
        map.insert("cherry".into(), 7);
        roundtrip(&map, 1);
    }

    #[test]
    fn test_btreemap_roundtrip_i32_string() {
        let mut map: BTreeMap<i32, String> = BTreeMap::new();
        map.insert(1, "one".into());
        map.insert(2, "two".into());
        map.insert(3, "three".into());
        roundtrip(&map, 5);
    }

    #[test]
    fn test_btreemap_empty() {
        let map: BTreeMap<String, i32> = BTreeMap::new();

        let mut buf = Vec::new();
        map.encode_map(1, &mut crate::cursor::WriteCursor::new(&mut buf));

        assert!(buf.is_empty());
        assert_eq!(map.encoded_map_len(1), 0);
    }

    #[test]
    fn test_btreemap_duplicate_key_last_wins() {
        use crate::cursor::WriteCursor;

        let mut buf = Vec::new();
        wire::encode_key(WireType::Len, 1, &mut WriteCursor::new(&mut buf));
        encode_map_entry(&String::from("test"), &100i32, &mut WriteCursor::new(&mut buf));
        wire::encode_key(WireType::Len, 1, &mut WriteCursor::new(&mut buf));
        encode_map_entry(&String::from("test"), &200i32, &mut WriteCursor::new(&mut buf));

        let mut decoded: BTreeMap<String, i32> = BTreeMap::new();
        let mut cur = ReadCursor::new(&buf);
        while !cur.is_end() {
            wire::decode_key(&mut cur).unwrap();
            decoded.decode_entry(&mut cur).unwrap();
        }

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get("test"), Some(&200));
    }

    #[test]
    fn test_btreemap_bool_key() {
        let mut map: BTreeMap<bool, i32> = BTreeMap::new();
        map.insert(true, 1);
        map.insert(false, 0);
        roundtrip(&map, 1);
    }
}

//! The three buffered I/O cursor flavors: an immutable read cursor, a
//! pull-based write cursor, and a size-only counter.
//!
//! [`ReadCursor`] borrows a byte span and tracks a position; every
//! fallible read either advances the position or leaves it untouched,
//! which is what makes [`ReadCursor::try_consume_matching_key`]'s
//! peek-then-rewind safe to call speculatively from a non-packed
//! repeated-field decode loop.
//!
//! [`WriteCursor`] and [`SizeCursor`] both implement [`Sink`] — the write
//! and size procedures generated per contract share the exact same
//! control flow, calling the same `encode_*` functions against whichever
//! `Sink` they were handed. This is what guarantees `calculate_X_size`
//! and `write_X` can never disagree on byte count: there is only
//! one code path, not two kept in sync by hand.

use crate::error::DecodeError;
use crate::wire::{self, ProtoKey, WireType};

/// An immutable byte span plus a cursor position.
///
/// Invariant: `0 <= position <= buf.len()` always holds.
#[derive(Clone)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// The unconsumed remainder of the span.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let b = *self.buf.get(self.pos).ok_or(DecodeError::BufferOverrun)?;
        self.pos += 1;
        Ok(b)
    }

    /// Advances by `n` bytes and returns the skipped-over slice.
    #[inline]
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::BufferOverrun);
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    /// Reads a `LEN`-prefixed span and returns a fresh cursor over just
    /// its payload.
    #[inline]
    pub fn read_length_prefixed(&mut self) -> Result<ReadCursor<'a>, DecodeError> {
        let len = wire::decode_len(self)?;
        Ok(ReadCursor::new(self.read_slice(len)?))
    }

    /// Saves the current position for a later [`ReadCursor::restore`].
    #[inline]
    pub fn save(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn restore(&mut self, pos: usize) {
        debug_assert!(pos <= self.buf.len());
        self.pos = pos;
    }

    /// Peeks the next key; if its field id equals `tag`, consumes it and
    /// returns its wire type. Otherwise rewinds to the position held
    /// before the peek and returns `None`.
    ///
    /// Returns `Ok(None)` without reading anything at end of input.
    #[inline]
    pub fn try_consume_matching_key(&mut self, tag: u32) -> Result<Option<WireType>, DecodeError> {
        if self.is_end() {
            return Ok(None);
        }
        let saved = self.save();
        let key = wire::decode_key(self)?;
        if key.tag() == tag {
            Ok(Some(key.wire_type()))
        } else {
            self.restore(saved);
            Ok(None)
        }
    }

    /// Reads the next key without consuming it on a mismatch; unlike
    /// [`ReadCursor::try_consume_matching_key`] this always rewinds and
    /// leaves the caller to decide what to do with the tag.
    #[inline]
    pub fn peek_key(&mut self) -> Result<Option<ProtoKey>, DecodeError> {
        if self.is_end() {
            return Ok(None);
        }
        let saved = self.save();
        let key = wire::decode_key(self)?;
        self.restore(saved);
        Ok(Some(key))
    }

    #[inline]
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        wire::skip_field(wire_type, self)
    }

    /// The raw bytes consumed since `start` (a position from
    /// [`ReadCursor::save`]). Used to capture a field's exact on-wire
    /// bytes verbatim, e.g. for unknown-field preservation.
    #[inline]
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }
}

/// A destination for encoded bytes, shared by [`WriteCursor`] (which
/// really writes) and [`SizeCursor`] (which only counts).
pub trait Sink {
    fn put_u8(&mut self, byte: u8);
    fn put_slice(&mut self, bytes: &[u8]);
}

/// A monotonic byte counter; every `Sink` method adds to the count
/// without producing any bytes. Used to compute `Calculate*Size` ahead
/// of a single forward write pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeCursor {
    count: usize,
}

impl SizeCursor {
    #[inline]
    pub fn new() -> Self {
        Self { count: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Sink for SizeCursor {
    #[inline]
    fn put_u8(&mut self, _byte: u8) {
        self.count += 1;
    }

    #[inline]
    fn put_slice(&mut self, bytes: &[u8]) {
        self.count += bytes.len();
    }
}

/// A write cursor over an owned output buffer.
///
/// The buffered-write-cursor contract from the design notes ("obtain a
/// contiguous staging area of at least N bytes, write into it, advance")
/// is satisfied here by `Vec<u8>`'s own growth: every `put_*` call is one
/// push/extend, and the caller pre-sizes the buffer via
/// [`crate::serialize`] running [`SizeCursor`] first, so in practice no
/// reallocation happens mid-encode.
#[cfg(feature = "alloc")]
pub struct WriteCursor<'a> {
    buf: &'a mut alloc::vec::Vec<u8>,
}

#[cfg(feature = "alloc")]
impl<'a> WriteCursor<'a> {
    #[inline]
    pub fn new(buf: &'a mut alloc::vec::Vec<u8>) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(feature = "alloc")]
impl<'a> Sink for WriteCursor<'a> {
    #[inline]
    fn put_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    #[inline]
    fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;

    #[test]
    fn rewind_is_idempotent_on_mismatch() {
        // key for tag=9, Varint, followed by a value byte, then a key for tag=10.
        let mut buf = alloc::vec::Vec::new();
        wire::encode_key(WireType::Varint, 9, &mut SinkVec(&mut buf));
        buf.push(6);
        wire::encode_key(WireType::Varint, 10, &mut SinkVec(&mut buf));
        buf.push(7);

        let mut cur = ReadCursor::new(&buf);
        let before = cur.save();
        assert!(matches!(cur.try_consume_matching_key(9), Ok(Some(WireType::Varint))));
        // consume the value byte for tag 9
        cur.read_u8().unwrap();

        let before_mismatch = cur.save();
        assert_eq!(cur.try_consume_matching_key(9).unwrap(), None);
        assert_eq!(cur.position(), before_mismatch, "rewind must restore exact position");
        let _ = before;
    }

    /// Test-only `Sink` adapter over a `Vec<u8>`, independent of the
    /// `alloc`-gated [`WriteCursor`] so this test runs under any feature set.
    struct SinkVec<'a>(&'a mut alloc::vec::Vec<u8>);
    impl<'a> Sink for SinkVec<'a> {
        fn put_u8(&mut self, byte: u8) {
            self.0.push(byte);
        }
        fn put_slice(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }
}

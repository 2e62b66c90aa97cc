//! Error taxonomy for protobuf decoding.
//!
//! Every variant here corresponds to a named condition in the wire-format
//! contract: malformed input surfaces immediately and is fatal for the
//! whole decode. Unknown field ids are *not* errors — they're skipped by
//! wire type at the call site, never routed through this type.

use thiserror::Error;

/// Reasons a decode can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Attempted to read past the end of the input span.
    #[error("attempted read past end of buffer")]
    BufferOverrun,
    /// A varint's continuation bit was still set past the legal byte count.
    #[error("malformed varint")]
    MalformedVarint,
    /// A tag's wire-type suffix was outside `{0, 1, 2, 5}` on a path that
    /// doesn't accept it (legal group markers are skip-only, see
    /// [`DecodeError::DeprecatedGroupEncoding`]).
    #[error("invalid wire type: {0}")]
    InvalidWireType(u8),
    /// A packed fixed-width blob's length wasn't a multiple of the
    /// element size.
    #[error("packed field length {actual} is not a multiple of element size {element_size}")]
    InvalidPackedLength { element_size: u8, actual: u32 },
    /// A varint decoded to a value too wide for the narrower target
    /// integer it was read into.
    #[error("value does not fit in {0}")]
    OverflowOnDecode(&'static str),
    /// A non-`ProtoInclude` field appeared before any `ProtoInclude` edge
    /// on an abstract or explicitly-polymorphic contract.
    #[error("a non-ProtoInclude field appeared before any ProtoInclude on a polymorphic contract")]
    PolymorphismFirst,
    /// A null/absent element was encountered in a repeated
    /// message/string sequence during write.
    #[error("null element in repeated field")]
    NullInRepeated,
    /// A generated reader expected a specific derived contract but the
    /// wire payload's leading wrapper tag names one of its siblings.
    #[error("wire payload does not match expected derived type")]
    TypeMismatch,
    /// A length-delimited string field was not valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,
    /// A proto2 group start/end marker (wire type 3/4) was encountered
    /// with a malformed nesting (e.g. an end marker with no matching
    /// start).
    #[error("malformed group encoding")]
    DeprecatedGroupEncoding,
    /// A `oneof` marked `required` had no variant present on decode.
    #[error("missing required oneof field (tag {0})")]
    MissingRequiredOneof(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn display_messages() {
        assert_eq!(
            format!("{}", DecodeError::InvalidWireType(7)),
            "invalid wire type: 7"
        );
        assert_eq!(
            format!(
                "{}",
                DecodeError::InvalidPackedLength {
                    element_size: 4,
                    actual: 15
                }
            ),
            "packed field length 15 is not a multiple of element size 4"
        );
        assert_eq!(
            format!("{}", DecodeError::MissingRequiredOneof(42)),
            "missing required oneof field (tag 42)"
        );
    }
}

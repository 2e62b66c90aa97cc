//! Efficient default value checking for protobuf types.
//!
//! Per the writer's default-value elision policy, a non-nullable
//! scalar field whose value is the protobuf default is omitted entirely:
//! no key, no length, no bytes. This trait lets generated `encode_own`
//! bodies check that cheaply, without needing a temporary `Default::default()`
//! to compare against.

/// Returns true if this value is the protobuf default value and should be
/// elided from the wire when stored in a non-nullable field.
pub trait IsProtoDefault {
    fn is_proto_default(&self) -> bool;
}

impl IsProtoDefault for u32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0
    }
}

impl IsProtoDefault for u64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0
    }
}

impl IsProtoDefault for i32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0
    }
}

impl IsProtoDefault for i64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0
    }
}

impl IsProtoDefault for bool {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        !*self
    }
}

impl IsProtoDefault for f32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0.0
    }
}

impl IsProtoDefault for f64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        *self == 0.0
    }
}

impl IsProtoDefault for super::Sint32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.0 == 0
    }
}

impl IsProtoDefault for super::Sint64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.0 == 0
    }
}

impl IsProtoDefault for super::Fixed32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.0 == 0
    }
}

impl IsProtoDefault for super::Fixed64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.0 == 0
    }
}

impl IsProtoDefault for super::Sfixed32 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.0 == 0
    }
}

impl IsProtoDefault for super::Sfixed64 {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.0 == 0
    }
}

/// A GUID is elided only when it equals the all-zero GUID.
impl IsProtoDefault for super::Guid {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_nil()
    }
}

#[cfg(feature = "alloc")]
impl IsProtoDefault for super::ProtoString {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(feature = "alloc")]
impl IsProtoDefault for super::ProtoBytes {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(feature = "alloc")]
impl IsProtoDefault for alloc::string::String {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(feature = "alloc")]
impl IsProtoDefault for alloc::vec::Vec<u8> {
    #[inline(always)]
    fn is_proto_default(&self) -> bool {
        self.is_empty()
    }
}

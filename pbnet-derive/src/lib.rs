//! Derive macros for `pbnet`.
//!
//! Provides `#[derive(ProtoMessage)]` and `#[derive(ProtoOneof)]` for
//! generating wire encode/decode/size procedures, and `#[derive(ProtoPoly)]`
//! for the nested-wrapper polymorphism scheme used on the downcast
//! direction of an inheritance hierarchy.

use darling::FromMeta;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{DeriveInput, Fields, Ident, Result, Type, Variant};

mod support;
use support::{parse_field_metadata, validate_tag, FieldKind, FieldMetadata};

/// Derive macro for implementing the `ProtoMessage` trait.
///
/// Note: you must also derive or implement `Default` for your struct.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, ProtoMessage)]
/// pub struct Person {
///     #[proto(tag = 1)]
///     name: ProtoString,
///     #[proto(tag = 2)]
///     id: i32,
///     #[proto(tag = 3, optional)]
///     email: Option<ProtoString>,
///     #[proto(tag = 4, repeated)]
///     phones: Vec<PhoneNumber>,
/// }
/// ```
///
/// A `#[proto(base)]` field embeds a parent contract by flattening —
/// inheritance with no nested-wrapper framing between base and derived
/// fields:
///
/// ```ignore
/// #[derive(Default, ProtoMessage)]
/// pub struct Dog {
///     #[proto(base)]
///     animal: Animal,
///     #[proto(tag = 2)]
///     bark_volume: i32,
/// }
/// ```
#[proc_macro_derive(ProtoMessage, attributes(proto))]
pub fn derive_proto_message(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match impl_proto_message(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn impl_proto_message(input: &DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;

    let fields = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "only named fields supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "only structs supported")),
    };

    let field_info: Vec<FieldMetadata> = fields
        .iter()
        .map(parse_field_metadata)
        .collect::<Result<Vec<_>>>()?;

    // Check for duplicate tags.
    let mut seen_tags = std::collections::BTreeSet::new();
    for f in &field_info {
        for tag in f.kind.all_tags() {
            if !seen_tags.insert(*tag) {
                let msg = format!("duplicate tag '{tag}' (tags must be unique across all fields)");
                return Err(syn::Error::new_spanned(f.name, msg));
            }
        }
    }

    // At most one "unknown" field.
    let mut seen_unknown = None;
    for f in &field_info {
        match (&seen_unknown, f.kind.is_unknown()) {
            (Some(name), true) => {
                let msg = format!(
                    "only a single field can be annotated with 'unknown', original '{name}'"
                );
                return Err(syn::Error::new_spanned(f.name, msg));
            }
            (None, true) => seen_unknown = Some(f.name),
            _ => (),
        }
    }

    // At most one "base" field.
    let base_field = field_info.iter().filter(|f| f.kind.is_base()).collect::<Vec<_>>();
    if base_field.len() > 1 {
        return Err(syn::Error::new_spanned(
            base_field[1].name,
            "only a single field can be annotated with 'base'",
        ));
    }
    let base_field = base_field.into_iter().next();

    let own_fields: Vec<&FieldMetadata> = field_info
        .iter()
        .filter(|f| !f.kind.is_base())
        .collect();

    let decode_own_impl = generate_decode_own(&own_fields);
    let encode_own_impl = generate_encode_own(&own_fields);
    let len_own_impl = generate_encoded_own_len(&own_fields);
    let base_impls = base_field.map(|base| generate_base_overrides(base));

    Ok(quote! {
        impl pbnet::codec::ProtoType for #name {
            const WIRE_TYPE: pbnet::wire::WireType = pbnet::wire::WireType::Len;
        }

        impl pbnet::codec::ProtoMessage for #name {
            #encode_own_impl
            #len_own_impl
            #decode_own_impl
            #base_impls
        }

        impl pbnet::codec::ProtoDecode for #name {
            #[inline]
            fn decode_into(cur: &mut pbnet::cursor::ReadCursor, dst: &mut Self) -> Result<(), pbnet::error::DecodeError> {
                *dst = pbnet::codec::decode_message_field(cur)?;
                Ok(())
            }
        }

        impl pbnet::codec::ProtoEncode for #name {
            #[inline]
            fn encode<S: pbnet::cursor::Sink>(&self, sink: &mut S) {
                pbnet::codec::encode_message_field(self, sink);
            }

            #[inline]
            fn encoded_len(&self) -> usize {
                pbnet::codec::encoded_message_field_len(self)
            }
        }
    })
}

/// Generates the `encode_content`/`encoded_content_len`/
/// `decode_inherited_field` overrides for a contract with a `#[proto(base)]`
/// field, folding into the base recursively so any inheritance depth works
/// without the derive macro needing to know the base's own ancestry.
fn generate_base_overrides(base: &FieldMetadata) -> TokenStream2 {
    let base_name = base.name;
    let base_ty = base.ty;

    quote! {
        #[inline]
        fn encode_content<S: pbnet::cursor::Sink>(&self, sink: &mut S) {
            self.encode_own(sink);
            pbnet::codec::ProtoMessage::encode_content(&self.#base_name, sink);
        }

        #[inline]
        fn encoded_content_len(&self) -> usize {
            self.encoded_own_len()
                + pbnet::codec::ProtoMessage::encoded_content_len(&self.#base_name)
        }

        #[inline]
        fn decode_inherited_field(
            cur: &mut pbnet::cursor::ReadCursor,
            tag: u32,
            wire_type: pbnet::wire::WireType,
            dst: &mut Self,
        ) -> Result<bool, pbnet::error::DecodeError> {
            if Self::decode_own_field(cur, tag, wire_type, dst)? {
                return Ok(true);
            }
            <#base_ty as pbnet::codec::ProtoMessage>::decode_inherited_field(cur, tag, wire_type, &mut dst.#base_name)
        }
    }
}

fn generate_decode_own(fields: &[&FieldMetadata]) -> TokenStream2 {
    let unknown_field = fields.iter().find(|f| f.kind.is_unknown());
    let regular_fields: Vec<_> = fields.iter().filter(|f| !f.kind.is_unknown()).collect();

    let oneof_fields: Vec<_> = regular_fields.iter().filter(|f| f.kind.as_oneof().is_some()).collect();
    let (required_oneofs, optional_oneofs): (Vec<_>, Vec<_>) = oneof_fields
        .into_iter()
        .partition(|f| f.kind.as_oneof().map(|(_, req)| req).unwrap_or(false));

    let regular_arms = regular_fields.iter().filter_map(|f| {
        if f.kind.as_oneof().is_some() {
            return None;
        }
        let fname = f.name;
        let fty = f.ty;
        let tag = f.kind.tag().unwrap();

        match &f.kind {
            FieldKind::Map { .. } => Some(quote! {
                #tag => {
                    pbnet::codec::ProtoMap::decode_entry(&mut dst.#fname, cur)?;
                    true
                }
            }),
            FieldKind::Repeated { .. } => {
                let inner_ty = extract_vec_inner_type(fty).unwrap_or(fty);
                Some(quote! {
                    #tag => {
                        pbnet::codec::decode_repeated_field::<#inner_ty>(cur, wire_type, &mut dst.#fname)?;
                        true
                    }
                })
            }
            _ => Some(quote! {
                #tag => {
                    <#fty as pbnet::codec::ProtoDecode>::decode_into(cur, &mut dst.#fname)?;
                    true
                }
            }),
        }
    });

    let optional_oneof_arms = optional_oneofs.iter().flat_map(|f| {
        let fname = f.name;
        let fty = f.ty;
        let (tags, _) = f.kind.as_oneof().unwrap();
        let inner_ty = extract_option_inner_type(fty);

        tags.iter().map(move |tag| match inner_ty {
            Some(inner) => quote! {
                #tag => {
                    pbnet::codec::decode_oneof_field::<#inner>(&mut dst.#fname, tag, wire_type, cur)?;
                    true
                }
            },
            None => quote! {
                #tag => {
                    compile_error!(concat!("oneof field `", stringify!(#fname), "` must have type Option<T>"));
                    true
                }
            },
        })
    });

    let required_oneof_temp_decls = required_oneofs.iter().map(|f| {
        let temp_name = format_ident!("__oneof_{}", f.name);
        let fty = f.ty;
        quote! { let mut #temp_name: Option<#fty> = None; }
    });

    let required_oneof_arms = required_oneofs.iter().flat_map(|f| {
        let temp_name = format_ident!("__oneof_{}", f.name);
        let fty = f.ty;
        let (tags, _) = f.kind.as_oneof().unwrap();

        tags.iter().map(move |tag| quote! {
            #tag => {
                pbnet::codec::decode_oneof_field::<#fty>(&mut #temp_name, tag, wire_type, cur)?;
                true
            }
        })
    });

    let required_oneof_assignments = required_oneofs.iter().map(|f| {
        let fname = f.name;
        let temp_name = format_ident!("__oneof_{}", f.name);
        let (tags, _) = f.kind.as_oneof().unwrap();
        let first_tag = tags[0];
        quote! {
            if matched {
                if let Some(value) = #temp_name.take() {
                    dst.#fname = value;
                }
            }
            let _ = #first_tag;
        }
    });

    let unknown_capture = if let Some(unk) = unknown_field {
        let fname = unk.name;
        quote! {
            pbnet::codec::capture_unknown_field(tag, wire_type, cur, &mut pbnet::cursor::WriteCursor::new(&mut unknown_accum))?;
            let _ = &dst.#fname;
        }
    } else {
        quote! {}
    };

    let unknown_init = if unknown_field.is_some() {
        quote! { let mut unknown_accum: alloc::vec::Vec<u8> = alloc::vec::Vec::new(); }
    } else {
        quote! {}
    };

    let unknown_finalize = if let Some(unk) = unknown_field {
        let fname = unk.name;
        quote! { dst.#fname.extend_from_slice(&unknown_accum); }
    } else {
        quote! {}
    };

    quote! {
        #[allow(unused_mut, unused_variables)]
        fn decode_own_field(
            cur: &mut pbnet::cursor::ReadCursor,
            tag: u32,
            wire_type: pbnet::wire::WireType,
            dst: &mut Self,
        ) -> Result<bool, pbnet::error::DecodeError> {
            #unknown_init
            #(#required_oneof_temp_decls)*

            let matched = match tag {
                #(#regular_arms)*
                #(#optional_oneof_arms)*
                #(#required_oneof_arms)*
                _ => false,
            };

            #(#required_oneof_assignments)*

            if !matched {
                #unknown_capture
            }

            #unknown_finalize

            Ok(matched)
        }
    }
}

fn generate_encode_own(fields: &[&FieldMetadata]) -> TokenStream2 {
    let unknown_field = fields.iter().find(|f| f.kind.is_unknown());
    let regular_fields: Vec<_> = fields.iter().filter(|f| !f.kind.is_unknown()).collect();

    let encode_fields = regular_fields.iter().map(|f| {
        let fname = f.name;
        let fty = f.ty;

        match &f.kind {
            FieldKind::Oneof { required: true, .. } => quote! {
                pbnet::codec::ProtoOneof::encode_variant(&self.#fname, sink);
            },
            FieldKind::Oneof { required: false, .. } => quote! {
                pbnet::codec::encode_oneof_field(&self.#fname, sink);
            },
            FieldKind::Map { tag } => quote! {
                pbnet::codec::ProtoMap::encode_map(&self.#fname, #tag, sink);
            },
            FieldKind::Repeated { tag, packed: true } => quote! {
                pbnet::codec::encode_packed_field(#tag, &self.#fname, sink);
            },
            FieldKind::Repeated { tag, packed: false } => quote! {
                pbnet::codec::encode_repeated_field(#tag, &self.#fname, sink);
            },
            FieldKind::Optional { tag } => quote! {
                if let Some(ref value) = self.#fname {
                    pbnet::wire::encode_key(<#fty as pbnet::codec::ProtoType>::WIRE_TYPE, #tag, sink);
                    pbnet::codec::ProtoEncode::encode(value, sink);
                }
            },
            FieldKind::Singular { tag } => quote! {
                if !<#fty as pbnet::codec::IsProtoDefault>::is_proto_default(&self.#fname) {
                    pbnet::wire::encode_key(<#fty as pbnet::codec::ProtoType>::WIRE_TYPE, #tag, sink);
                    <#fty as pbnet::codec::ProtoEncode>::encode(&self.#fname, sink);
                }
            },
            FieldKind::Unknown | FieldKind::Base => unreachable!("filtered out"),
        }
    });

    let encode_unknown = if let Some(unk) = unknown_field {
        let fname = unk.name;
        quote! {
            if !self.#fname.is_empty() {
                pbnet::cursor::Sink::put_slice(sink, &self.#fname);
            }
        }
    } else {
        quote! {}
    };

    quote! {
        fn encode_own<S: pbnet::cursor::Sink>(&self, sink: &mut S) {
            #(#encode_fields)*
            #encode_unknown
        }
    }
}

fn generate_encoded_own_len(fields: &[&FieldMetadata]) -> TokenStream2 {
    let unknown_field = fields.iter().find(|f| f.kind.is_unknown());
    let regular_fields: Vec<_> = fields.iter().filter(|f| !f.kind.is_unknown()).collect();

    let len_fields = regular_fields.iter().map(|f| {
        let fname = f.name;
        let fty = f.ty;

        match &f.kind {
            FieldKind::Oneof { required: true, .. } => quote! {
                len += pbnet::codec::ProtoOneof::encoded_variant_len(&self.#fname);
            },
            FieldKind::Oneof { required: false, .. } => quote! {
                len += pbnet::codec::encoded_oneof_field_len(&self.#fname);
            },
            FieldKind::Map { tag } => quote! {
                len += pbnet::codec::ProtoMap::encoded_map_len(&self.#fname, #tag);
            },
            FieldKind::Repeated { tag, packed: true } => quote! {
                len += pbnet::codec::encoded_packed_field_len(#tag, &self.#fname);
            },
            FieldKind::Repeated { tag, packed: false } => quote! {
                len += pbnet::codec::encoded_repeated_field_len(#tag, &self.#fname);
            },
            FieldKind::Optional { tag } => quote! {
                if let Some(ref value) = self.#fname {
                    len += pbnet::wire::encoded_key_len(#tag) + pbnet::codec::ProtoEncode::encoded_len(value);
                }
            },
            FieldKind::Singular { tag } => quote! {
                if !<#fty as pbnet::codec::IsProtoDefault>::is_proto_default(&self.#fname) {
                    len += pbnet::wire::encoded_key_len(#tag) + <#fty as pbnet::codec::ProtoEncode>::encoded_len(&self.#fname);
                }
            },
            FieldKind::Unknown | FieldKind::Base => unreachable!("filtered out"),
        }
    });

    let len_unknown = if let Some(unk) = unknown_field {
        let fname = unk.name;
        quote! { len += self.#fname.len(); }
    } else {
        quote! {}
    };

    quote! {
        fn encoded_own_len(&self) -> usize {
            let mut len = 0usize;
            #(#len_fields)*
            #len_unknown
            len
        }
    }
}

/// Extract the inner type from an `Option<T>` type. `None` means `ty`
/// isn't an `Option`, a configuration error at the call site.
fn extract_option_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner);
                    }
                }
            }
        }
    }
    None
}

/// Extract the inner type from a `Vec<T>` type.
fn extract_vec_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Vec" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return Some(inner);
                    }
                }
            }
        }
    }
    None
}

/// Derive macro for implementing `ProtoOneof` on enums.
///
/// Each variant must have exactly one unnamed field and a
/// `#[proto(tag = N)]` attribute.
///
/// # Example
///
/// ```ignore
/// #[derive(ProtoOneof)]
/// pub enum Widget {
///     #[proto(tag = 1)]
///     Quux(i32),
///     #[proto(tag = 2)]
///     Bar(ProtoString),
///     #[proto(tag = 3)]
///     Nested(Box<SomeMessage>),
/// }
///
/// #[derive(Default, ProtoMessage)]
/// pub struct Foo {
///     #[proto(oneof, tags = "1, 2, 3")]
///     widget: Option<Widget>,
/// }
/// ```
#[proc_macro_derive(ProtoOneof, attributes(proto))]
pub fn derive_proto_oneof(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match impl_proto_oneof(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct OneofVariantInfo<'a> {
    name: &'a Ident,
    ty: &'a Type,
    tag: u32,
}

/// Raw attributes parsed from `#[proto(...)]` on a oneof variant.
#[derive(Debug, Default, FromMeta)]
#[darling(default)]
struct RawProtoVariantAttrs {
    tag: Option<u32>,
}

fn impl_proto_oneof(input: &DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;

    let variants = match &input.data {
        syn::Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "ProtoOneof can only be derived for enums",
            ))
        }
    };

    let variant_info: Vec<OneofVariantInfo> = variants
        .iter()
        .map(parse_oneof_variant)
        .collect::<Result<Vec<_>>>()?;

    let decode_variant_impl = generate_oneof_decode(name, &variant_info);
    let encode_variant_impl = generate_oneof_encode(name, &variant_info);
    let encoded_len_impl = generate_oneof_len(name, &variant_info);
    let variant_tag_impl = generate_oneof_tag(name, &variant_info);
    let variant_wire_type_impl = generate_oneof_wire_type(name, &variant_info);

    Ok(quote! {
        impl pbnet::codec::ProtoOneof for #name {
            #decode_variant_impl
            #encode_variant_impl
            #encoded_len_impl
            #variant_tag_impl
            #variant_wire_type_impl
        }
    })
}

fn parse_oneof_variant(variant: &Variant) -> Result<OneofVariantInfo<'_>> {
    let ty = match &variant.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed.first().unwrap().ty,
        _ => {
            return Err(syn::Error::new_spanned(
                variant,
                "oneof variants must have exactly one unnamed field, e.g., `Foo(i32)`",
            ))
        }
    };

    let raw = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("proto"))
        .map(|attr| RawProtoVariantAttrs::from_meta(&attr.meta))
        .transpose()
        .map_err(|e| syn::Error::new_spanned(variant, e.to_string()))?
        .unwrap_or_default();

    match raw.tag {
        Some(t) => {
            validate_tag(t, variant.span())?;
            Ok(OneofVariantInfo {
                name: &variant.ident,
                ty,
                tag: t,
            })
        }
        None => Err(syn::Error::new_spanned(
            variant,
            "missing #[proto(tag = N)] attribute on oneof variant",
        )),
    }
}

fn generate_oneof_decode(enum_name: &Ident, variants: &[OneofVariantInfo]) -> TokenStream2 {
    let decode_arms = variants.iter().map(|v| {
        let vname = v.name;
        let vty = v.ty;
        let tag = v.tag;

        quote! {
            #tag => {
                if wire_type != <#vty as pbnet::codec::ProtoType>::WIRE_TYPE {
                    return Err(pbnet::error::DecodeError::InvalidWireType(wire_type.into_val()));
                }
                let mut value = <#vty as ::core::default::Default>::default();
                <#vty as pbnet::codec::ProtoDecode>::decode_into(cur, &mut value)?;
                Ok(Some(#enum_name::#vname(value)))
            }
        }
    });

    quote! {
        fn decode_variant(
            tag: u32,
            wire_type: pbnet::wire::WireType,
            cur: &mut pbnet::cursor::ReadCursor,
        ) -> Result<Option<Self>, pbnet::error::DecodeError> {
            match tag {
                #(#decode_arms)*
                _ => Ok(None),
            }
        }
    }
}

fn generate_oneof_encode(enum_name: &Ident, variants: &[OneofVariantInfo]) -> TokenStream2 {
    let encode_arms = variants.iter().map(|v| {
        let vname = v.name;
        let vty = v.ty;
        let tag = v.tag;

        quote! {
            #enum_name::#vname(ref value) => {
                pbnet::wire::encode_key(<#vty as pbnet::codec::ProtoType>::WIRE_TYPE, #tag, sink);
                <#vty as pbnet::codec::ProtoEncode>::encode(value, sink);
            }
        }
    });

    quote! {
        fn encode_variant<S: pbnet::cursor::Sink>(&self, sink: &mut S) {
            match self {
                #(#encode_arms)*
            }
        }
    }
}

fn generate_oneof_len(enum_name: &Ident, variants: &[OneofVariantInfo]) -> TokenStream2 {
    let len_arms = variants.iter().map(|v| {
        let vname = v.name;
        let vty = v.ty;
        let tag = v.tag;

        quote! {
            #enum_name::#vname(ref value) => {
                pbnet::wire::encoded_key_len(#tag) + <#vty as pbnet::codec::ProtoEncode>::encoded_len(value)
            }
        }
    });

    quote! {
        fn encoded_variant_len(&self) -> usize {
            match self {
                #(#len_arms)*
            }
        }
    }
}

fn generate_oneof_tag(enum_name: &Ident, variants: &[OneofVariantInfo]) -> TokenStream2 {
    let tag_arms = variants.iter().map(|v| {
        let vname = v.name;
        let tag = v.tag;
        quote! { #enum_name::#vname(_) => #tag }
    });

    quote! {
        fn variant_tag(&self) -> u32 {
            match self {
                #(#tag_arms),*
            }
        }
    }
}

fn generate_oneof_wire_type(enum_name: &Ident, variants: &[OneofVariantInfo]) -> TokenStream2 {
    let wire_type_arms = variants.iter().map(|v| {
        let vname = v.name;
        let vty = v.ty;
        quote! { #enum_name::#vname(_) => <#vty as pbnet::codec::ProtoType>::WIRE_TYPE }
    });

    quote! {
        fn variant_wire_type(&self) -> pbnet::wire::WireType {
            match self {
                #(#wire_type_arms),*
            }
        }
    }
}

/// Derive macro for implementing the nested-wrapper polymorphism dispatch
/// table (`ProtoInclude` framing) on an enum modeling an inheritance chain.
/// See [`poly`] for the attribute surface and generated shape.
#[proc_macro_derive(ProtoPoly, attributes(proto))]
pub fn derive_proto_poly(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match poly::derive_proto_poly_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

mod poly;

#[cfg(test)]
mod tests;

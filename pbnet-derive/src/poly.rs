//! `#[derive(ProtoPoly)]`: the nested-wrapper polymorphism dispatch table.
//!
//! A polymorphic inheritance chain `A <- B <- C` is modeled as an enum whose
//! variants are declared root-to-leaf, each non-root variant carrying the
//! `ProtoInclude` field id connecting it to its immediate predecessor:
//!
//! ```ignore
//! #[derive(ProtoPoly)]
//! pub enum AnimalKind {
//!     Animal(Animal),
//!     #[proto(include = 5)]
//!     Dog(Dog),
//!     #[proto(include = 10)]
//!     Puppy(Puppy),
//! }
//! ```
//!
//! Each non-root payload type embeds its predecessor via a `#[proto(base)]`
//! field named `base` (see `support::FieldKind::Base`), the same
//! inheritance-by-flattening convention `#[derive(ProtoMessage)]` uses
//! elsewhere — `ProtoPoly` only adds the `ProtoInclude` wrapper framing on
//! top of it.
//!
//! Only a linear chain is supported, matching every worked example in the
//! source specification and its explicit "three-level inheritance only"
//! bound; a branching derivation forest is out of scope here (see
//! `DESIGN.md`).

use darling::FromMeta;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{DeriveInput, Fields, Ident, Result, Type, Variant};

const MAX_POLY_DEPTH: usize = 3;

struct PolyVariant<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    /// `ProtoInclude` edge connecting this variant to the previous one;
    /// `None` only for the root (first) variant.
    include: Option<u32>,
}

#[derive(Debug, Default, FromMeta)]
#[darling(default)]
struct RawPolyVariantAttrs {
    include: Option<u32>,
}

pub fn derive_proto_poly_impl(input: &DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;

    let variants = match &input.data {
        syn::Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "ProtoPoly can only be derived for enums",
            ))
        }
    };

    if variants.is_empty() {
        return Err(syn::Error::new_spanned(input, "ProtoPoly enum must declare at least one variant"));
    }
    if variants.len() > MAX_POLY_DEPTH {
        let msg = format!(
            "inheritance chains deeper than {MAX_POLY_DEPTH} levels are not supported; \
             this enum declares {} variants",
            variants.len()
        );
        return Err(syn::Error::new_spanned(variants, msg));
    }

    let parsed: Vec<PolyVariant> = variants
        .iter()
        .enumerate()
        .map(|(idx, v)| parse_poly_variant(v, idx))
        .collect::<Result<Vec<_>>>()?;

    let edges: Vec<u32> = parsed[1..].iter().map(|v| v.include.unwrap()).collect();

    let decode_fns = (0..parsed.len())
        .map(|level| generate_decode_level(name, &parsed, &edges, level))
        .collect::<Vec<_>>();

    let encode_arms = parsed.iter().enumerate().map(|(k, v)| {
        let vident = v.ident;
        let body = generate_encode_for_leaf(&edges, k);
        quote! {
            #name::#vident(v) => { #body }
        }
    });

    let len_arms = parsed.iter().enumerate().map(|(k, v)| {
        let vident = v.ident;
        let body = generate_len_for_leaf(&edges, k);
        quote! {
            #name::#vident(v) => { #body }
        }
    });

    let root_ident = parsed[0].ident;
    let root_ty = parsed[0].ty;

    Ok(quote! {
        impl pbnet::codec::ProtoType for #name {
            const WIRE_TYPE: pbnet::wire::WireType = pbnet::wire::WireType::Len;
        }

        #[allow(non_snake_case)]
        impl #name {
            #(#decode_fns)*
        }

        impl pbnet::codec::ProtoMessage for #name {
            #[inline]
            fn encode_own<S: pbnet::cursor::Sink>(&self, sink: &mut S) {
                match self {
                    #(#encode_arms)*
                }
            }

            #[inline]
            fn encoded_own_len(&self) -> usize {
                match self {
                    #(#len_arms)*
                }
            }

            #[inline]
            fn decode_own_field(
                _cur: &mut pbnet::cursor::ReadCursor,
                _tag: u32,
                _wire_type: pbnet::wire::WireType,
                _dst: &mut Self,
            ) -> Result<bool, pbnet::error::DecodeError> {
                unreachable!("decode_content is overridden for polymorphic enums")
            }

            #[inline]
            fn decode_content(cur: &mut pbnet::cursor::ReadCursor) -> Result<Self, pbnet::error::DecodeError> {
                Self::__decode_poly_level_0(cur)
            }
        }

        impl Default for #name {
            #[inline]
            fn default() -> Self {
                #name::#root_ident(<#root_ty as ::core::default::Default>::default())
            }
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

fn parse_poly_variant<'a>(variant: &'a Variant, idx: usize) -> Result<PolyVariant<'a>> {
    let ty = match &variant.fields {
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed.first().unwrap().ty,
        _ => {
            return Err(syn::Error::new_spanned(
                variant,
                "poly variants must have exactly one unnamed field, e.g., `Dog(Dog)`",
            ))
        }
    };

    let raw = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("proto"))
        .map(|attr| RawPolyVariantAttrs::from_meta(&attr.meta))
        .transpose()
        .map_err(|e| syn::Error::new_spanned(variant, e.to_string()))?
        .unwrap_or_default();

    if idx == 0 {
        if raw.include.is_some() {
            return Err(syn::Error::new_spanned(
                variant,
                "the root (first) variant of a ProtoPoly enum must not declare 'include'",
            ));
        }
    } else if raw.include.is_none() {
        return Err(syn::Error::new_spanned(
            variant,
            "non-root ProtoPoly variants require #[proto(include = N)], the ProtoInclude \
             edge id connecting them to the previous variant",
        ));
    }

    Ok(PolyVariant {
        ident: &variant.ident,
        ty,
        include: raw.include,
    })
}

/// `v` hopped through its `.base` chain `hops` times, reaching the struct
/// for an ancestor level `hops` steps up from the leaf `v` is bound to.
fn hop_base(hops: usize) -> TokenStream2 {
    let mut expr = quote! { v };
    for _ in 0..hops {
        expr = quote! { (#expr).base };
    }
    expr
}

/// Generates `encode_own` for a value bound to the leaf variant at index `k`
/// (0-based, root is index 0), writing nested `ProtoInclude` wrappers
/// outer-to-inner and each level's own fields just after its wrapper closes.
fn generate_encode_for_leaf(edges: &[u32], k: usize) -> TokenStream2 {
    fn go(edges: &[u32], k: usize, i: usize) -> TokenStream2 {
        let level_val = hop_base(k - i);
        if i == k {
            quote! { pbnet::codec::ProtoMessage::encode_own(&(#level_val), sink); }
        } else {
            let edge = edges[i];
            let inner = go(edges, k, i + 1);
            let size_expr = gen_size_expr(edges, k, i + 1);
            quote! {
                pbnet::wire::encode_key(pbnet::wire::WireType::Len, #edge, sink);
                {
                    let __sz: usize = #size_expr;
                    <u64 as pbnet::leb128::LebCodec>::encode_leb128(__sz as u64, sink);
                }
                #inner
                pbnet::codec::ProtoMessage::encode_own(&(#level_val), sink);
            }
        }
    }
    go(edges, k, 0)
}

fn generate_len_for_leaf(edges: &[u32], k: usize) -> TokenStream2 {
    let expr = gen_size_expr(edges, k, 0);
    quote! { #expr }
}

/// The encoded byte length of levels `i..=k`, nested wrapper framing
/// included from level `i` inward.
fn gen_size_expr(edges: &[u32], k: usize, i: usize) -> TokenStream2 {
    let level_val = hop_base(k - i);
    if i == k {
        quote! { pbnet::codec::ProtoMessage::encoded_own_len(&(#level_val)) }
    } else {
        let edge = edges[i];
        let inner = gen_size_expr(edges, k, i + 1);
        quote! {
            {
                let __inner: usize = #inner;
                pbnet::wire::encoded_key_len(#edge)
                    + <u64 as pbnet::leb128::LebCodec>::encoded_leb128_len(__inner as u64)
                    + __inner
                    + pbnet::codec::ProtoMessage::encoded_own_len(&(#level_val))
            }
        }
    }
}

/// Generates `__decode_poly_level_<level>`, the content reader for the
/// struct at chain position `level`. Its sub-cursor may contain this
/// level's own fields and, if `level` isn't the deepest declared variant,
/// at most one `ProtoInclude` edge into the next level.
fn generate_decode_level(enum_name: &Ident, parsed: &[PolyVariant], edges: &[u32], level: usize) -> TokenStream2 {
    let fn_name = format_ident!("__decode_poly_level_{}", level);
    let own_ty = parsed[level].ty;
    let own_ident = parsed[level].ident;

    let has_child = level + 1 < parsed.len();

    let child_dispatch = if has_child {
        let edge = edges[level];
        let child_fn = format_ident!("__decode_poly_level_{}", level + 1);
        quote! {
            if tag == #edge {
                let mut sub = cur.read_length_prefixed()?;
                deeper = Some(Self::#child_fn(&mut sub)?);
                continue;
            }
        }
    } else {
        quote! {}
    };

    let assemble = if has_child {
        // `deeper` may resolve to any variant strictly below `level`, not
        // just the immediate child — e.g. at the root, a 3-level chain's
        // leaf comes back two `.base` hops deep. The hop count is the
        // distance from `level` to that variant's own declared position.
        let deeper_arms = parsed[level + 1..].iter().enumerate().map(|(offset, v)| {
            let vident = v.ident;
            let hops = offset + 1;
            let mut target = quote! { inner };
            for _ in 0..hops - 1 {
                target = quote! { #target.base };
            }
            quote! {
                Some(#enum_name::#vident(mut inner)) => {
                    #target.base = own;
                    #enum_name::#vident(inner)
                }
            }
        });
        quote! {
            match deeper {
                None => #enum_name::#own_ident(own),
                #(#deeper_arms)*
                Some(_) => unreachable!("decoded variant outside this node's subtree"),
            }
        }
    } else {
        quote! { #enum_name::#own_ident(own) }
    };

    let deeper_decl = if has_child {
        quote! { let mut deeper: Option<Self> = None; }
    } else {
        quote! {}
    };

    quote! {
        fn #fn_name(cur: &mut pbnet::cursor::ReadCursor) -> Result<Self, pbnet::error::DecodeError> {
            let mut own = <#own_ty as ::core::default::Default>::default();
            #deeper_decl
            while !cur.is_end() {
                let key = pbnet::wire::decode_key(cur)?;
                let (wire_type, tag) = key.into_parts();
                #child_dispatch
                if <#own_ty as pbnet::codec::ProtoMessage>::decode_own_field(cur, tag, wire_type, &mut own)? {
                    continue;
                }
                cur.skip_field(wire_type)?;
            }
            Ok(#assemble)
        }
    }
}

//! Snapshot tests for the derive macros.

use crate::poly::derive_proto_poly_impl;
use crate::{impl_proto_message, impl_proto_oneof};
use proc_macro2::TokenStream as TokenStream2;
use syn::{parse_quote, DeriveInput};

/// Format generated tokens as pretty Rust code for snapshots.
fn format_tokens(tokens: TokenStream2) -> String {
    let file = syn::parse_file(&tokens.to_string()).expect("generated invalid syntax");
    prettyplease::unparse(&file)
}

#[test]
fn test_simple_message() {
    let input: DeriveInput = parse_quote! {
        struct Person {
            #[proto(tag = 1)]
            name: String,
            #[proto(tag = 2)]
            id: i32,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_message_with_optional() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1)]
            required_field: i32,
            #[proto(tag = 2, optional)]
            optional_field: Option<String>,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_message_with_repeated() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1)]
            name: String,
            #[proto(tag = 2, repeated)]
            values: Vec<i32>,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_message_with_map() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1, map)]
            entries: BTreeMap<String, i32>,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_message_with_oneof() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1)]
            id: i32,
            #[proto(oneof, tags = "2, 3, 4")]
            payload: Option<Payload>,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_message_with_required_oneof() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1)]
            id: i32,
            #[proto(oneof, tags = "2, 3", required)]
            payload: Payload,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_message_with_unknown_fields() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1)]
            known_field: i32,
            #[proto(unknown)]
            unknown_fields: alloc::vec::Vec<u8>,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_message_with_packed_repeated() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1, repeated, packed)]
            values: Vec<i32>,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_packed_on_non_repeated_field_is_rejected() {
    let input: DeriveInput = parse_quote! {
        struct Message {
            #[proto(tag = 1, packed)]
            value: i32,
        }
    };
    assert!(impl_proto_message(&input).is_err());
}

#[test]
fn test_message_with_base_field() {
    let input: DeriveInput = parse_quote! {
        struct Dog {
            #[proto(base)]
            base: Animal,
            #[proto(tag = 2)]
            bark_volume: i32,
        }
    };
    let output = impl_proto_message(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_base_field_rejects_other_attrs() {
    let input: DeriveInput = parse_quote! {
        struct Dog {
            #[proto(base, tag = 1)]
            base: Animal,
        }
    };
    assert!(impl_proto_message(&input).is_err());
}

#[test]
fn test_oneof_enum() {
    let input: DeriveInput = parse_quote! {
        enum Payload {
            #[proto(tag = 1)]
            IntValue(i32),
            #[proto(tag = 2)]
            StringValue(String),
            #[proto(tag = 3)]
            Nested(Box<NestedMessage>),
        }
    };
    let output = impl_proto_oneof(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_poly_three_level_chain() {
    let input: DeriveInput = parse_quote! {
        enum AnimalKind {
            Animal(Animal),
            #[proto(include = 5)]
            Dog(Dog),
            #[proto(include = 10)]
            Puppy(Puppy),
        }
    };
    let output = derive_proto_poly_impl(&input).expect("derive failed");
    insta::assert_snapshot!(format_tokens(output));
}

#[test]
fn test_poly_root_cannot_declare_include() {
    let input: DeriveInput = parse_quote! {
        enum AnimalKind {
            #[proto(include = 1)]
            Animal(Animal),
        }
    };
    assert!(derive_proto_poly_impl(&input).is_err());
}

#[test]
fn test_poly_rejects_depth_beyond_three() {
    let input: DeriveInput = parse_quote! {
        enum Kind {
            A(A),
            #[proto(include = 1)]
            B(B),
            #[proto(include = 2)]
            C(C),
            #[proto(include = 3)]
            D(D),
        }
    };
    assert!(derive_proto_poly_impl(&input).is_err());
}

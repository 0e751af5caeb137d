//! Derive macros for `logmask`.
//!
//! This crate generates the conversion behind `#[derive(ToMeta)]`. It:
//! - reads `#[meta(...)]` container, variant and field attributes
//! - emits a `ToMeta` implementation that builds a `Meta` tree field by field
//!
//! It does **not** sanitize anything. Masking and truncation happen in the main
//! `logmask` crate when the metadata is logged.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::{Ident, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Result};

mod container;
mod derive_enum;
mod derive_struct;
mod field;
mod generics;
mod rename;
use container::{parse_container_options, ContainerOptions};
use derive_enum::derive_enum;
use derive_struct::derive_struct;
use generics::add_to_meta_bounds;

/// Derives `logmask::ToMeta` for structs and enums.
///
/// # Shape
///
/// - Named structs become objects with one key per field, in declaration order.
/// - Tuple structs become lists; a single-field tuple struct becomes its field.
/// - Unit structs become `null`.
/// - Unit variants become the variant name as a string. Other variants become
///   a single-key object `{ "Variant": payload }`, the payload shaped like the
///   matching struct kind.
///
/// # Container Attributes
///
/// - `#[meta(rename_all = "...")]` - Renames struct fields, or the variants of
///   an enum. Fields inside enum variants keep their names. Accepts `camelCase`, `snake_case`, `PascalCase`, `kebab-case` and
///   `lowercase`.
///
/// # Field and Variant Attributes
///
/// - `#[meta(skip)]` - Leaves the field out. A skipped variant becomes `null`.
/// - `#[meta(rename = "name")]` - Uses `name` as the key. Not allowed on tuple
///   fields, which have no key.
///
/// Generic parameters used by non-skipped fields get a `ToMeta` bound.
/// `PhantomData<T>` fields never add one. Unions are rejected at compile time.
#[proc_macro_derive(ToMeta, attributes(meta))]
pub fn derive_to_meta(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the logmask crate root.
///
/// Handles crate renaming (e.g., `my_log = { package = "logmask", ... }`).
/// Inside logmask itself `extern crate self as logmask` keeps `::logmask`
/// valid, which also covers its integration tests and doctests.
fn crate_root() -> TokenStream {
    match crate_name("logmask") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::logmask },
    }
}

struct DeriveOutput {
    body: TokenStream,
    used_generics: Vec<Ident>,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let ContainerOptions { rename_all } = parse_container_options(&attrs)?;
    let root = crate_root();

    let DeriveOutput {
        body,
        used_generics,
    } = match data {
        Data::Struct(data) => derive_struct(data, rename_all, &generics, &root)?,
        Data::Enum(data) => derive_enum(data, rename_all, &generics, &root)?,
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span,
                "`ToMeta` cannot be derived for unions",
            ));
        }
    };

    let bounded = add_to_meta_bounds(generics, &used_generics, &root);
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    Ok(quote! {
        impl #impl_generics #root::ToMeta for #ident #ty_generics #where_clause {
            fn to_meta(&self) -> #root::Meta {
                #body
            }
        }
    })
}

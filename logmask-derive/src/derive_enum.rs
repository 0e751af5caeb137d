//! Enum-specific `ToMeta` derivation.
//!
//! This module generates one match arm per variant and collects generic
//! parameters that require trait bounds.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{ext::IdentExt, DataEnum, Fields, Result};

use crate::{
    derive_struct::{lower_fields, LoweredFields},
    field::parse_field_options,
    rename::RenameRule,
    DeriveOutput,
};

pub(crate) fn derive_enum(
    data: DataEnum,
    rename_all: RenameRule,
    generics: &syn::Generics,
    root: &TokenStream,
) -> Result<DeriveOutput> {
    if data.variants.is_empty() {
        return Ok(DeriveOutput {
            body: quote! { match *self {} },
            used_generics: Vec::new(),
        });
    }

    let mut arms = Vec::new();
    let mut used_generics = Vec::new();

    for variant in data.variants {
        let variant_ident = variant.ident;
        let options = parse_field_options(&variant.attrs)?;
        if options.skip {
            arms.push(quote! { Self::#variant_ident { .. } => #root::Meta::Null });
            continue;
        }

        let name = options.rename.map_or_else(
            || rename_all.apply_to_variant(&variant_ident.unraw().to_string()),
            |rename| rename.value(),
        );

        if matches!(variant.fields, Fields::Unit) {
            arms.push(quote! { Self::#variant_ident => #root::Meta::from(#name) });
            continue;
        }

        // Field names inside a variant are kept as written.
        let LoweredFields { pattern, body } = lower_fields(
            variant.fields,
            RenameRule::None,
            generics,
            root,
            &mut used_generics,
        )?;
        arms.push(quote! {
            Self::#variant_ident #pattern => {
                let __meta_payload = { #body };
                let __meta_variant = #root::Object::new();
                __meta_variant.insert(#name, __meta_payload);
                #root::Meta::Object(__meta_variant)
            }
        });
    }

    Ok(DeriveOutput {
        body: quote! {
            match self {
                #(#arms),*
            }
        },
        used_generics,
    })
}

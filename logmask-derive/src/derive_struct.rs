//! Struct-specific `ToMeta` derivation.
//!
//! This module also lowers a field list into a destructuring pattern plus the
//! code that builds its `Meta`. Enum variants reuse that lowering.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Fields, Result};

use crate::{
    field::parse_field_options, generics::collect_generics_from_type, rename::RenameRule,
    DeriveOutput,
};

/// A field list lowered to `pattern => body`.
pub(crate) struct LoweredFields {
    /// Destructures the fields, e.g. `{ id, name, .. }` or `(__field_0, _)`.
    pub(crate) pattern: TokenStream,
    /// Evaluates to `Meta` using the bindings introduced by `pattern`.
    pub(crate) body: TokenStream,
}

pub(crate) fn derive_struct(
    data: DataStruct,
    rename_all: RenameRule,
    generics: &syn::Generics,
    root: &TokenStream,
) -> Result<DeriveOutput> {
    let mut used_generics = Vec::new();
    let LoweredFields { pattern, body } =
        lower_fields(data.fields, rename_all, generics, root, &mut used_generics)?;

    let body = if pattern.is_empty() {
        body
    } else {
        quote! {
            let Self #pattern = self;
            #body
        }
    };

    Ok(DeriveOutput {
        body,
        used_generics,
    })
}

pub(crate) fn lower_fields(
    fields: Fields,
    rename_all: RenameRule,
    generics: &syn::Generics,
    root: &TokenStream,
    used_generics: &mut Vec<Ident>,
) -> Result<LoweredFields> {
    match fields {
        Fields::Named(fields) => lower_named(fields, rename_all, generics, root, used_generics),
        Fields::Unnamed(fields) => lower_unnamed(fields, generics, root, used_generics),
        Fields::Unit => Ok(LoweredFields {
            pattern: TokenStream::new(),
            body: quote! { #root::Meta::Null },
        }),
    }
}

fn lower_named(
    fields: syn::FieldsNamed,
    rename_all: RenameRule,
    generics: &syn::Generics,
    root: &TokenStream,
    used_generics: &mut Vec<Ident>,
) -> Result<LoweredFields> {
    let mut bindings = Vec::new();
    let mut inserts = Vec::new();

    for field in fields.named {
        let span = field.span();
        let options = parse_field_options(&field.attrs)?;
        if options.skip {
            continue;
        }
        let Some(binding) = field.ident else {
            return Err(syn::Error::new(span, "named field should have an identifier"));
        };

        let key = options.rename.map_or_else(
            || rename_all.apply_to_field(&binding.unraw().to_string()),
            |rename| rename.value(),
        );
        collect_generics_from_type(&field.ty, generics, used_generics);

        inserts.push(quote_spanned! { span =>
            __meta_object.insert(#key, #root::ToMeta::to_meta(#binding));
        });
        bindings.push(binding);
    }

    Ok(LoweredFields {
        pattern: quote! { { #(#bindings,)* .. } },
        body: quote! {
            let __meta_object = #root::Object::new();
            #(#inserts)*
            #root::Meta::Object(__meta_object)
        },
    })
}

fn lower_unnamed(
    fields: syn::FieldsUnnamed,
    generics: &syn::Generics,
    root: &TokenStream,
    used_generics: &mut Vec<Ident>,
) -> Result<LoweredFields> {
    let newtype = fields.unnamed.len() == 1;
    let mut patterns = Vec::new();
    let mut bindings = Vec::new();

    for (index, field) in fields.unnamed.into_iter().enumerate() {
        let options = parse_field_options(&field.attrs)?;
        if let Some(rename) = options.rename {
            return Err(syn::Error::new(
                rename.span(),
                "`rename` has no effect on tuple fields",
            ));
        }
        if options.skip {
            patterns.push(quote! { _ });
            continue;
        }

        let binding = format_ident!("__field_{index}");
        collect_generics_from_type(&field.ty, generics, used_generics);
        patterns.push(quote! { #binding });
        bindings.push(binding);
    }

    let body = match bindings.as_slice() {
        [] if newtype => quote! { #root::Meta::Null },
        [only] if newtype => quote! { #root::ToMeta::to_meta(#only) },
        _ => quote! {
            let __meta_list = #root::List::new();
            #(__meta_list.push(#root::ToMeta::to_meta(#bindings));)*
            #root::Meta::List(__meta_list)
        },
    };

    Ok(LoweredFields {
        pattern: quote! { ( #(#patterns),* ) },
        body,
    })
}

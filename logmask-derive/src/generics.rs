//! Generic type parameter handling and trait bound management.
//!
//! Bounds are added only for generics that appear in converted fields.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` fields are skipped when collecting generics:
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     marker: PhantomData<T>,  // T should NOT require ToMeta
//! }
//! ```
//!
//! `PhantomData<T>` itself converts to `null` regardless of `T`.

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            if let Some(qself) = &path.qself {
                collect_generics_from_type(&qself.ty, generics, result);
            }
            let Some(segment) = path.path.segments.last() else {
                return;
            };
            if segment.ident == "PhantomData" {
                return;
            }

            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner_ty) = arg {
                        collect_generics_from_type(inner_ty, generics, result);
                    }
                }
            }

            // `T` or an associated path such as `T::Id`.
            if let Some(first) = path.path.segments.first() {
                for param in generics.type_params() {
                    if first.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                        result.push(param.ident.clone());
                    }
                }
            }
        }
        syn::Type::Reference(reference) => {
            collect_generics_from_type(&reference.elem, generics, result);
        }
        syn::Type::Slice(slice) => collect_generics_from_type(&slice.elem, generics, result),
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        syn::Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result);
            }
        }
        _ => {}
    }
}

/// Adds `ToMeta` bounds to generic parameters used in converted fields.
pub(crate) fn add_to_meta_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    root: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#root::ToMeta));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use quote::{format_ident, quote, ToTokens};

    use super::*;

    fn collect(ty: TokenStream) -> Vec<Ident> {
        let generics: syn::Generics = parse_quote!(<T, U>);
        let ty: syn::Type = syn::parse2(ty).unwrap();
        let mut result = Vec::new();
        collect_generics_from_type(&ty, &generics, &mut result);
        result
    }

    #[test]
    fn nested_and_compound_types_are_searched() {
        assert_eq!(collect(quote! { Vec<Option<T>> }), vec![format_ident!("T")]);
        assert_eq!(collect(quote! { &'a [U] }), vec![format_ident!("U")]);
        assert_eq!(
            collect(quote! { (T, [U; 4]) }),
            vec![format_ident!("T"), format_ident!("U")]
        );
    }

    #[test]
    fn phantom_data_adds_nothing() {
        assert!(collect(quote! { PhantomData<T> }).is_empty());
        assert!(collect(quote! { ::core::marker::PhantomData<T> }).is_empty());
    }

    #[test]
    fn bounds_are_added_only_to_used_params() {
        let generics: syn::Generics = parse_quote!(<T: Clone, U>);
        let bounded = add_to_meta_bounds(generics, &[format_ident!("T")], &quote! { ::logmask });
        let params: Vec<_> = bounded.type_params().collect();
        assert_eq!(params[0].bounds.len(), 2);
        assert!(params[0]
            .bounds
            .to_token_stream()
            .to_string()
            .contains("ToMeta"));
        assert!(params[1].bounds.is_empty());
    }
}

//! Container-level attribute parsing for `#[derive(ToMeta)]`.
//!
//! This module handles attributes on the struct/enum itself, not on fields.

use syn::{Attribute, LitStr, Meta, Result};

use crate::rename::RenameRule;

/// Options parsed from container-level `#[meta(...)]` attributes.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ContainerOptions {
    pub(crate) rename_all: RenameRule,
}

/// Parses container-level `#[meta(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("meta") {
            continue;
        }

        match &attr.meta {
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "expected `#[meta(rename_all = \"...\")]` on the container",
                ));
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        let value: LitStr = meta.value()?.parse()?;
                        options.rename_all = RenameRule::parse(&value.value()).ok_or_else(|| {
                            syn::Error::new(
                                value.span(),
                                format!(
                                    "unknown rename rule `{}`; expected one of `lowercase`, \
`camelCase`, `snake_case`, `PascalCase`, `kebab-case`",
                                    value.value()
                                ),
                            )
                        })?;
                        Ok(())
                    } else {
                        Err(meta.error(format!(
                            "unknown container option `{}`; expected `rename_all`",
                            meta.path
                                .get_ident()
                                .map_or_else(|| "?".to_string(), ToString::to_string)
                        )))
                    }
                })?;
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "name-value syntax is not supported for container-level #[meta]",
                ));
            }
        }
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_returns_defaults() {
        let attrs = parse_attrs(quote! {});
        let options = parse_container_options(&attrs).unwrap();
        assert_eq!(options.rename_all, RenameRule::None);
    }

    #[test]
    fn rename_all_is_parsed() {
        let attrs = parse_attrs(quote! { #[meta(rename_all = "camelCase")] });
        let options = parse_container_options(&attrs).unwrap();
        assert_eq!(options.rename_all, RenameRule::CamelCase);
    }

    #[test]
    fn unknown_rule_errors() {
        let attrs = parse_attrs(quote! { #[meta(rename_all = "SHOUTING")] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("unknown rename rule `SHOUTING`"));
    }

    #[test]
    fn unknown_option_errors() {
        let attrs = parse_attrs(quote! { #[meta(unknown_option)] });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("unknown container option"));
    }

    #[test]
    fn bare_meta_on_container_errors() {
        let attrs = parse_attrs(quote! { #[meta] });
        assert!(parse_container_options(&attrs).is_err());
    }

    #[test]
    fn other_attributes_ignored() {
        let attrs = parse_attrs(quote! {
            #[derive(Clone)]
            #[serde(rename_all = "camelCase")]
        });
        let options = parse_container_options(&attrs).unwrap();
        assert_eq!(options.rename_all, RenameRule::None);
    }
}

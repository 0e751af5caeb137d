//! Parsing of `#[meta(...)]` field and variant attributes.
//!
//! | Attribute | Effect |
//! |-----------|--------|
//! | None | Field is converted with `ToMeta` under its own name |
//! | `#[meta(skip)]` | Field is left out |
//! | `#[meta(rename = "x")]` | Field is emitted under `x` |

use syn::{Attribute, LitStr, Meta, Result};

#[derive(Clone, Debug, Default)]
pub(crate) struct FieldOptions {
    pub(crate) skip: bool,
    pub(crate) rename: Option<LitStr>,
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("meta") {
            continue;
        }

        match &attr.meta {
            Meta::Path(path) => {
                return Err(syn::Error::new_spanned(
                    path,
                    "expected `#[meta(skip)]` or `#[meta(rename = \"...\")]`",
                ));
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        if options.skip {
                            return Err(meta.error("duplicate `skip`"));
                        }
                        options.skip = true;
                        Ok(())
                    } else if meta.path.is_ident("rename") {
                        if options.rename.is_some() {
                            return Err(meta.error("duplicate `rename`"));
                        }
                        options.rename = Some(meta.value()?.parse()?);
                        Ok(())
                    } else {
                        Err(meta.error(format!(
                            "unknown field option `{}`; expected `skip` or `rename`",
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
                    "name-value syntax is not supported for #[meta]",
                ));
            }
        }
    }

    Ok(options)
}

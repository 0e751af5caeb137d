//! Case conversion for `#[meta(rename_all = "...")]`.
//!
//! Rust field names are assumed to be snake_case and variant names PascalCase.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum RenameRule {
    /// Keep names as written.
    #[default]
    None,
    LowerCase,
    CamelCase,
    SnakeCase,
    PascalCase,
    KebabCase,
}

impl RenameRule {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "lowercase" => Some(Self::LowerCase),
            "camelCase" => Some(Self::CamelCase),
            "snake_case" => Some(Self::SnakeCase),
            "PascalCase" => Some(Self::PascalCase),
            "kebab-case" => Some(Self::KebabCase),
            _ => None,
        }
    }

    pub(crate) fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::None | Self::SnakeCase => field.to_owned(),
            Self::LowerCase => field.to_ascii_lowercase(),
            Self::KebabCase => field.replace('_', "-"),
            Self::PascalCase => {
                let mut out = String::with_capacity(field.len());
                let mut upper = true;
                for ch in field.chars() {
                    if ch == '_' {
                        upper = true;
                    } else if upper {
                        out.push(ch.to_ascii_uppercase());
                        upper = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            Self::CamelCase => lower_first(&Self::PascalCase.apply_to_field(field)),
        }
    }

    pub(crate) fn apply_to_variant(self, variant: &str) -> String {
        match self {
            Self::None | Self::PascalCase => variant.to_owned(),
            Self::LowerCase => variant.to_ascii_lowercase(),
            Self::CamelCase => lower_first(variant),
            Self::SnakeCase => {
                let mut out = String::with_capacity(variant.len() + 4);
                for (i, ch) in variant.char_indices() {
                    if i > 0 && ch.is_uppercase() {
                        out.push('_');
                    }
                    out.push(ch.to_ascii_lowercase());
                }
                out
            }
            Self::KebabCase => Self::SnakeCase.apply_to_variant(variant).replace('_', "-"),
        }
    }
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_lowercase().to_string() + chars.as_str()
    })
}

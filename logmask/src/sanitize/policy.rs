//! Masking and truncation policies for single values.
//!
//! Policies are pure transformations. They do not traverse structures; the
//! walker decides which policy applies to which value.

use serde_json::Value;

/// Symbol used for masked characters.
pub const MASK_CHAR: char = '*';

/// Suffix appended to truncated strings.
pub const ELLIPSIS: &str = "...";

/// Display text of a masked object.
pub const OBJECT_TEXT: &str = "[object Object]";

/// Ordered, de-duplicated set of lowercase field-name fragments.
///
/// A field is sensitive when any fragment occurs anywhere in its lowercased
/// name, so `"token"` matches `accessToken`, `TOKEN` and `token_id`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockList {
    entries: Vec<String>,
}

impl BlockList {
    /// Builds a block-list. Entries are lowercased; duplicates keep their first position.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for entry in entries {
            let entry = entry.as_ref().to_lowercase();
            if !list.entries.contains(&entry) {
                list.entries.push(entry);
            }
        }
        list
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true when `field` contains any entry, ignoring case.
    pub fn is_sensitive(&self, field: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let field = field.to_lowercase();
        self.entries.iter().any(|entry| field.contains(entry.as_str()))
    }
}

impl<S> FromIterator<S> for BlockList
where
    S: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Masks a value, keeping at most `visible_chars` trailing characters.
///
/// - `null` stays `null`.
/// - Strings are masked as-is; any other value is masked in its display text
///   (see [`display_text`]), so a container never exposes its last key or item.
/// - When `visible_chars` is zero or the value is not longer than
///   `visible_chars`, every character is masked and the length is preserved.
/// - Otherwise the masked run is `min(len - visible_chars, max_masked_chars)`
///   characters long, so long secrets produce a bounded prefix.
///
/// Lengths count Unicode scalar values.
pub fn mask(value: &Value, visible_chars: usize, max_masked_chars: usize) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(text) => Value::String(mask_str(text, visible_chars, max_masked_chars)),
        other => Value::String(mask_str(
            &display_text(other),
            visible_chars,
            max_masked_chars,
        )),
    }
}

/// Flat text a value is masked as.
///
/// Scalars render as themselves, `null` as the empty string, objects as
/// [`OBJECT_TEXT`] and lists as their items' text joined with commas.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(display_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => OBJECT_TEXT.to_owned(),
    }
}

fn mask_str(text: &str, visible_chars: usize, max_masked_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if visible_chars == 0 || total <= visible_chars {
        return MASK_CHAR.to_string().repeat(total);
    }

    let masked = (total - visible_chars).min(max_masked_chars);
    let mut out = String::with_capacity(masked + visible_chars);
    out.extend(std::iter::repeat(MASK_CHAR).take(masked));
    out.extend(&chars[total - visible_chars..]);
    out
}

/// Shortens strings longer than `max_len` characters to exactly `max_len`,
/// ending in [`ELLIPSIS`]. Every other value is returned unchanged.
pub fn truncate(value: Value, max_len: usize) -> Value {
    match value {
        Value::String(text) if text.chars().count() > max_len => {
            let keep = max_len.saturating_sub(ELLIPSIS.len());
            let mut out: String = text.chars().take(keep).collect();
            out.push_str(ELLIPSIS);
            Value::String(out)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{display_text, mask, truncate, BlockList};

    #[test]
    fn block_list_matches_substrings_ignoring_case() {
        let list = BlockList::new(["abc"]);
        assert!(list.is_sensitive("abc"));
        assert!(list.is_sensitive("ABC"));
        assert!(list.is_sensitive("myAbcField"));
        assert!(!list.is_sensitive("ab"));
        assert!(!list.is_sensitive("a_b_c"));
    }

    #[test]
    fn block_list_lowercases_and_dedupes() {
        let list = BlockList::new(["Password", "TOKEN", "password"]);
        assert_eq!(list.entries(), ["password", "token"]);
        assert!(list.is_sensitive("userPassword"));
        assert!(list.is_sensitive("refresh_token"));
    }

    #[test]
    fn empty_block_list_flags_nothing() {
        let list = BlockList::default();
        assert!(list.is_empty());
        assert!(!list.is_sensitive("password"));
    }

    #[test]
    fn mask_keeps_trailing_visible_chars() {
        assert_eq!(mask(&json!("123456"), 3, 10), json!("***456"));
        assert_eq!(mask(&json!("saudades"), 3, 10), json!("*****des"));
    }

    #[test]
    fn mask_caps_the_masked_run() {
        assert_eq!(
            mask(&json!("abcdefghijklmnopqrstuvwxyz"), 4, 8),
            json!("********wxyz")
        );
    }

    #[test]
    fn mask_fully_masks_short_values() {
        assert_eq!(mask(&json!("ab"), 4, 8), json!("**"));
        assert_eq!(mask(&json!("abcd"), 4, 8), json!("****"));
        assert_eq!(mask(&json!(""), 4, 8), json!(""));
    }

    #[test]
    fn mask_with_zero_visible_chars_masks_everything() {
        // The cap does not apply in this branch; length is preserved.
        assert_eq!(mask(&json!("abcdefghijkl"), 0, 3), json!("************"));
    }

    #[test]
    fn mask_handles_non_strings() {
        assert_eq!(mask(&Value::Null, 4, 8), Value::Null);
        assert_eq!(mask(&json!(123_456), 3, 10), json!("***456"));
        assert_eq!(mask(&json!(true), 4, 8), json!("****"));
        assert_eq!(mask(&json!([1, 2]), 2, 8), json!("*,2"));
    }

    #[test]
    fn mask_hides_container_contents() {
        assert_eq!(mask(&json!({"pin": "9876"}), 4, 8), json!("********ect]"));
        assert_eq!(mask(&json!({}), 4, 8), json!("********ect]"));
        assert_eq!(mask(&json!([{"pin": "9876"}]), 4, 8), json!("********ect]"));
        assert_eq!(mask(&json!([]), 4, 8), json!(""));
    }

    #[test]
    fn display_text_flattens_lists() {
        assert_eq!(display_text(&json!([1, [2, 3], null, "x"])), "1,2,3,,x");
        assert_eq!(display_text(&json!([{"a": 1}, true])), "[object Object],true");
        assert_eq!(display_text(&Value::Null), "");
    }

    #[test]
    fn mask_counts_scalar_values() {
        assert_eq!(mask(&json!("秘密数据"), 1, 8), json!("***据"));
    }

    #[test]
    fn truncate_cuts_long_strings_to_exact_length() {
        let value = truncate(json!("abcdefghijklmno"), 10);
        assert_eq!(value, json!("abcdefg..."));
        assert_eq!(value.as_str().unwrap().chars().count(), 10);
    }

    #[test]
    fn truncate_leaves_short_strings_and_non_strings() {
        assert_eq!(truncate(json!("abcdefghij"), 10), json!("abcdefghij"));
        assert_eq!(truncate(json!(12_345_678_901_u64), 3), json!(12_345_678_901_u64));
        assert_eq!(truncate(Value::Null, 3), Value::Null);
        assert_eq!(truncate(json!(false), 0), json!(false));
    }
}

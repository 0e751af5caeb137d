//! The metadata sanitization pipeline.
//!
//! - **`errors`**: error-like values and their normalization into plain fields
//! - **`serializer`**: bounded, cycle-safe flattening of a [`crate::Meta`] graph
//! - **`policy`**: block-list matching, masking and truncation of single values
//! - **`walk`**: recursive application of the policies over a flattened tree
//!
//! Order matters: cycles are broken by the serializer, so the walker only ever
//! sees finite trees.

mod errors;
mod policy;
mod serializer;
mod walk;

pub use errors::{normalize, normalize_error, CapturedError, ErrorLike};
pub use policy::{display_text, mask, truncate, BlockList, ELLIPSIS, MASK_CHAR, OBJECT_TEXT};
pub use serializer::SafeSerializer;
pub use walk::walk;
pub(crate) use walk::walk_object;

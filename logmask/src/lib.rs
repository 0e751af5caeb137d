//! Safe structured logging: bounded serialization plus masking of sensitive fields.
//!
//! This crate separates:
//! - **Serialization**: flattening an arbitrary, possibly cyclic metadata graph
//!   ([`Meta`]) into plain JSON data without hanging or overflowing the stack.
//! - **Sanitization**: masking values of block-listed fields and truncating
//!   long strings in the resulting tree.
//!
//! The [`Logger`] facade ties both together and hands the sanitized record to
//! a [`Sink`]. The default [`ConsoleSink`] writes through `slog`: JSON lines
//! via `slog-json`, or the `slog-term` format when `developmentFormat` is set.
//! Any other `slog::Logger` can be wrapped in [`SlogSink`](crate::slog::SlogSink).
//!
//! Key rules:
//! - A field is sensitive when any block-list entry is a case-insensitive
//!   substring of its name. Sensitivity depends on the key, never on the value.
//! - Sensitive values are masked; every other string is truncated. A value is
//!   never both.
//! - Errors are normalized into `name`/`message`/`stack` objects before they
//!   are serialized, so they never collapse into `{}`.
//! - A log call never panics or returns an error. Sanitization failures are
//!   reported through the sink's error level instead.
//!
//! What this crate does not do:
//! - transport or persist records
//! - filter by level beyond passing the configured level to the sink
//!
//! The `ToMeta` derive macro lives in `logmask-derive` and is re-exported here.

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
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use logmask_derive::ToMeta;

#[allow(unused_extern_crates)]
extern crate self as logmask;

// Module declarations
mod config;
mod error;
mod logger;
mod meta;
mod sanitize;
mod sink;
pub mod slog;

// Re-exports
pub use config::{Level, LoggerOptions, SanitizerConfig, LOG_LEVEL_ENV, MAX_DEPTH};
pub use error::{ConfigError, ParseLevelError, SerializeError};
pub use logger::{Logger, Templates};
pub use meta::{List, Meta, Object, ToMeta};
pub use sanitize::{
    display_text, mask, normalize, normalize_error, truncate, walk, BlockList, CapturedError,
    ErrorLike, SafeSerializer, ELLIPSIS, MASK_CHAR, OBJECT_TEXT,
};
pub use sink::{ConsoleFormat, ConsoleSink, Record, Sink};

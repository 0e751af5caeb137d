//! Error-like values and their normalization.
//!
//! Errors carry their useful data behind methods, not fields, so a naive
//! serialization would reduce them to an empty object. Normalization copies
//! `name`, `message` and `stack` into a plain [`Object`] first.

use std::{
    any,
    backtrace::{Backtrace, BacktraceStatus},
    borrow::Cow,
    error::Error,
    fmt::Write as _,
};

use crate::meta::{Meta, Object};

/// Capability: exposes name, message and stack-shaped fields.
///
/// Implement it for domain error types that want control over how they are
/// logged, or capture any `std::error::Error` with [`CapturedError`].
pub trait ErrorLike {
    /// Short type-like name, e.g. `"Error"` or `"TimeoutError"`.
    fn name(&self) -> Cow<'_, str>;

    fn message(&self) -> Cow<'_, str>;

    fn stack(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Additional own fields, emitted before `name`, `message` and `stack`.
    fn fields(&self) -> Vec<(String, Meta)> {
        Vec::new()
    }
}

/// A snapshot of a Rust error taken at capture time.
///
/// The stack is rendered as `"<name>: <message>"`, one `caused by:` line per
/// `source()` in the chain, then the backtrace when one was captured.
#[derive(Clone, Debug)]
pub struct CapturedError {
    name: String,
    message: String,
    stack: String,
    fields: Vec<(String, Meta)>,
}

impl CapturedError {
    /// Captures `err`, naming it after its concrete type.
    pub fn new<E>(err: &E) -> Self
    where
        E: Error + 'static,
    {
        Self::capture(short_type_name(any::type_name::<E>()), err)
    }

    /// Captures a type-erased error. The name defaults to `"Error"`.
    pub fn from_dyn(err: &(dyn Error + 'static)) -> Self {
        Self::capture("Error", err)
    }

    fn capture(name: &str, err: &(dyn Error + 'static)) -> Self {
        let message = err.to_string();
        let mut stack = format!("{name}: {message}");
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = write!(stack, "\n    caused by: {cause}");
            source = cause.source();
        }
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            let _ = write!(stack, "\n{backtrace}");
        }
        Self {
            name: name.to_owned(),
            message,
            stack,
            fields: Vec::new(),
        }
    }

    /// Overrides the name. The first stack line is kept as captured.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attaches an extra own field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Meta>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }
}

impl ErrorLike for CapturedError {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }

    fn stack(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.stack))
    }

    fn fields(&self) -> Vec<(String, Meta)> {
        self.fields.clone()
    }
}

// `std::io::error::Error` -> `Error`, `my::Wrapper<T>` -> `Wrapper`
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Flattens an error-like value into a fresh object.
///
/// Own fields come first; `name`, `message` and `stack` follow and win over
/// own fields of the same name. A missing stack is emitted as `null`.
pub fn normalize_error(err: &dyn ErrorLike) -> Object {
    let object: Object = err.fields().into_iter().collect();
    object.insert("name", err.name());
    object.insert("message", err.message());
    object.insert("stack", err.stack());
    object
}

/// Returns the normalized form of an error node; any other node unchanged.
pub fn normalize(value: &Meta) -> Meta {
    match value {
        Meta::Error(err) => Meta::Object(normalize_error(err.as_ref())),
        other => other.clone(),
    }
}

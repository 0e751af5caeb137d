//! The boundary between the logger and whatever writes records.
//!
//! A [`Sink`] receives fully sanitized records. It owns rendering, level
//! filtering and transport; the logger owns everything before that.
//!
//! The bundled [`ConsoleSink`] is a [`SlogSink`] over a `slog-json` or
//! `slog-term` drain behind a level filter.

use std::{
    io::{self, Write},
    rc::Rc,
    sync::Mutex,
};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use slog::{o, Drain, FnValue, PushFnValue};

use crate::{
    config::{Level, LoggerOptions},
    slog::SlogSink,
};

/// One sanitized log record.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    pub level: Level,
    /// Message with the context prefix applied.
    pub message: &'a str,
    /// Sanitized metadata, including `service`.
    pub metadata: &'a Map<String, Value>,
}

/// Receiver of sanitized records.
pub trait Sink {
    fn log(&self, record: &Record<'_>);

    /// Whether records at `level` would be emitted. The logger skips
    /// sanitization entirely for disabled levels.
    fn enabled(&self, level: Level) -> bool {
        let _ = level;
        true
    }
}

impl<S> Sink for &S
where
    S: Sink + ?Sized,
{
    fn log(&self, record: &Record<'_>) {
        (**self).log(record);
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }
}

impl<S> Sink for Box<S>
where
    S: Sink + ?Sized,
{
    fn log(&self, record: &Record<'_>) {
        (**self).log(record);
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }
}

impl<S> Sink for Rc<S>
where
    S: Sink + ?Sized,
{
    fn log(&self, record: &Record<'_>) {
        (**self).log(record);
    }

    fn enabled(&self, level: Level) -> bool {
        (**self).enabled(level)
    }
}

/// Line format of [`ConsoleSink`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsoleFormat {
    /// One JSON object per line with `timestamp`, `level`, `message` and the metadata.
    #[default]
    Json,
    /// `slog-term` full format: timestamp, level, message, then `key: value` pairs.
    Development,
}

/// Writes one line per record, dropping records below a threshold.
///
/// Write errors are ignored: a log call never fails.
#[derive(Clone, Debug)]
pub struct ConsoleSink {
    inner: SlogSink,
}

impl ConsoleSink {
    pub fn stderr(format: ConsoleFormat, threshold: Level) -> Self {
        Self::with_writer(io::stderr(), format, threshold)
    }

    /// Picks format and threshold from `developmentFormat` and `logLevel`.
    pub fn from_options(options: &LoggerOptions) -> Self {
        let format = if options.development_format {
            ConsoleFormat::Development
        } else {
            ConsoleFormat::Json
        };
        Self::stderr(format, options.log_level)
    }

    pub fn with_writer<W>(writer: W, format: ConsoleFormat, threshold: Level) -> Self
    where
        W: Write + Send + 'static,
    {
        let logger = match format {
            ConsoleFormat::Json => {
                let drain = slog_json::Json::new(writer)
                    .set_newlines(true)
                    .add_key_value(o!(
                        "timestamp" => FnValue(|_: &slog::Record<'_>| {
                            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
                        }),
                        "level" => FnValue(|record: &slog::Record<'_>| {
                            Level::from(record.level()).as_str()
                        }),
                        "message" => PushFnValue(|record: &slog::Record<'_>, serializer| {
                            serializer.emit(record.msg())
                        }),
                    ))
                    .build();
                let drain = Mutex::new(drain)
                    .filter_level(threshold.into())
                    .ignore_res();
                slog::Logger::root(drain, o!())
            }
            ConsoleFormat::Development => {
                let decorator = slog_term::PlainSyncDecorator::new(writer);
                let drain = slog_term::FullFormat::new(decorator)
                    .build()
                    .filter_level(threshold.into())
                    .ignore_res();
                slog::Logger::root(drain, o!())
            }
        };
        Self {
            inner: SlogSink::new(logger),
        }
    }

    pub fn logger(&self) -> &slog::Logger {
        self.inner.logger()
    }
}

impl Sink for ConsoleSink {
    fn log(&self, record: &Record<'_>) {
        self.inner.log(record);
    }

    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }
}

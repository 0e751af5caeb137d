//! The logging facade.
//!
//! Every call runs the same pipeline:
//!
//! 1. serialize the per-call extra with [`SafeSerializer`] (cycles broken,
//!    errors normalized, depth and breadth bounded);
//! 2. merge it over the default extra, per-call keys winning;
//! 3. mask and truncate the merged map;
//! 4. add `service` and hand the record to the [`Sink`].
//!
//! If step 1 fails, the record is dropped and a single `"Logging error:"`
//! record carrying the failure is emitted at [`Level::Error`] instead.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    config::{Level, LoggerOptions, SanitizerConfig},
    error::{ConfigError, SerializeError},
    meta::Meta,
    sanitize::{walk_object, BlockList, CapturedError, SafeSerializer},
    sink::{ConsoleSink, Record, Sink},
};

/// Key under which a scalar extra is merged.
const EXTRA_KEY: &str = "extra";
const SERVICE_KEY: &str = "service";
const FAILURE_MESSAGE: &str = "Logging error:";

/// A context-labelled logger that sanitizes metadata before it reaches `S`.
///
/// Mutators take `&mut self`. To share one logger between threads, wrap it in
/// a lock or give each worker its own instance.
#[derive(Debug)]
pub struct Logger<S = ConsoleSink> {
    sink: S,
    config: SanitizerConfig,
    context: String,
    service: String,
    default_extra: Map<String, Value>,
}

impl Logger<ConsoleSink> {
    /// Builds a logger writing to stderr, formatted per `developmentFormat`
    /// and filtered at `logLevel`.
    pub fn console(options: LoggerOptions) -> Result<Self, ConfigError> {
        let sink = ConsoleSink::from_options(&options);
        Self::new(options, sink)
    }
}

impl<S> Logger<S>
where
    S: Sink,
{
    pub fn new(options: LoggerOptions, sink: S) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            config: options.sanitizer_config(),
            context: options.context,
            service: options.service,
            default_extra: Map::new(),
            sink,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    pub fn default_extra(&self) -> &Map<String, Value> {
        &self.default_extra
    }

    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    /// Merges `extra` into the default extra; its keys win.
    ///
    /// The value is serialized under the logger's bounds first. If that fails
    /// the default extra is left unchanged and the failure is reported like a
    /// failed log call.
    pub fn set_default_extra(&mut self, extra: &Meta) {
        match self.config.serializer().serialize(extra) {
            Ok(value) => merge_into(&mut self.default_extra, value),
            Err(err) => self.report_failure(&err),
        }
    }

    /// Replaces the default extra wholesale.
    pub fn set_extra(&mut self, extra: &Meta) {
        match self.config.serializer().serialize(extra) {
            Ok(value) => {
                let mut replacement = Map::new();
                merge_into(&mut replacement, value);
                self.default_extra = replacement;
            }
            Err(err) => self.report_failure(&err),
        }
    }

    /// Replaces the block-list wholesale.
    pub fn set_block_list<I, T>(&mut self, block_list: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.config.block_list = BlockList::new(block_list);
    }

    pub fn debug(&self, message: &str, extra: Option<&Meta>) {
        self.log(Level::Debug, message, extra);
    }

    pub fn info(&self, message: &str, extra: Option<&Meta>) {
        self.log(Level::Info, message, extra);
    }

    pub fn warn(&self, message: &str, extra: Option<&Meta>) {
        self.log(Level::Warn, message, extra);
    }

    pub fn error(&self, message: &str, extra: Option<&Meta>) {
        self.log(Level::Error, message, extra);
    }

    /// Logs `message` at `level`. Never fails and never panics.
    pub fn log(&self, level: Level, message: &str, extra: Option<&Meta>) {
        if !self.sink.enabled(level) {
            return;
        }
        match self.sanitize(extra) {
            Ok(metadata) => self.emit(level, &self.format_message(message), metadata),
            Err(err) => self.report_failure(&err),
        }
    }

    /// Logs a `serde::Serialize` value as the extra.
    ///
    /// A value serde cannot represent is reported like any other
    /// serialization failure.
    pub fn log_serialize<T>(&self, level: Level, message: &str, extra: &T)
    where
        T: Serialize + ?Sized,
    {
        if !self.sink.enabled(level) {
            return;
        }
        match Meta::from_serialize(extra) {
            Ok(meta) => self.log(level, message, Some(&meta)),
            Err(err) => self.report_failure(&err),
        }
    }

    /// Fixed-message helpers.
    pub fn tmpl(&self) -> Templates<'_, S> {
        Templates { logger: self }
    }

    /// Serializes `extra`, merges it over the default extra and masks the result.
    ///
    /// This is what [`Logger::log`] hands to the sink, minus `service`.
    pub fn sanitize(&self, extra: Option<&Meta>) -> Result<Map<String, Value>, SerializeError> {
        let mut merged = self.default_extra.clone();
        if let Some(extra) = extra {
            let value = SafeSerializer::new(&self.config).serialize(extra)?;
            merge_into(&mut merged, value);
        }
        Ok(walk_object(&merged, &self.config))
    }

    fn format_message(&self, message: &str) -> String {
        format!("{}: {message}", self.context)
    }

    fn emit(&self, level: Level, message: &str, mut metadata: Map<String, Value>) {
        if !metadata.contains_key(SERVICE_KEY) {
            metadata.insert(SERVICE_KEY.to_owned(), Value::String(self.service.clone()));
        }
        self.sink.log(&Record {
            level,
            message,
            metadata: &metadata,
        });
    }

    fn report_failure(&self, err: &SerializeError) {
        if !self.sink.enabled(Level::Error) {
            return;
        }
        let captured = Meta::error_like(CapturedError::new(err));
        let error = self
            .config
            .serializer()
            .serialize(&captured)
            .unwrap_or_else(|_| Value::String(err.to_string()));
        let mut metadata = Map::new();
        metadata.insert("error".to_owned(), error);
        self.emit(Level::Error, FAILURE_MESSAGE, metadata);
    }
}

// Objects merge key by key, lists under their indices, other scalars under
// `extra`. Null contributes nothing.
fn merge_into(target: &mut Map<String, Value>, value: Value) {
    match value {
        Value::Object(entries) => target.extend(entries),
        Value::Array(items) => target.extend(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item)),
        ),
        Value::Null => {}
        scalar => {
            target.insert(EXTRA_KEY.to_owned(), scalar);
        }
    }
}

/// Canned messages, obtained from [`Logger::tmpl`].
pub struct Templates<'a, S> {
    logger: &'a Logger<S>,
}

impl<S> Templates<'_, S>
where
    S: Sink,
{
    /// `info("Execution started")`
    pub fn start(&self, extra: Option<&Meta>) {
        self.logger.info("Execution started", extra);
    }

    /// `info("Executed successfully")`
    pub fn success(&self, extra: Option<&Meta>) {
        self.logger.info("Executed successfully", extra);
    }

    /// `error("Execution failed")`
    pub fn error(&self, extra: Option<&Meta>) {
        self.logger.error("Execution failed", extra);
    }

    /// `error("Failed to find <resource>")`
    pub fn not_found(&self, resource: &str, extra: Option<&Meta>) {
        self.logger
            .error(&format!("Failed to find {resource}"), extra);
    }
}

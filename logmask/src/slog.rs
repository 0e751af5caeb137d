//! A [`Sink`] that forwards sanitized records to a `slog::Logger`.
//!
//! Each metadata field becomes one key-value pair on the slog record: strings,
//! booleans, numbers and null through the matching `emit_*` call, objects and
//! arrays as nested serde values. Field names are dynamic, so this module
//! relies on slog's `dynamic-keys` feature.
//!
//! Level filtering belongs to the drains of the `slog::Logger` passed in;
//! [`Sink::enabled`] asks them, so filtered records are never sanitized.

use serde_json::{Map, Value};
use slog::{
    Drain, Key, Record as SlogRecord, Result as SlogResult, Serializer, Value as SlogValue, KV,
};

use crate::{
    config::Level,
    sink::{Record, Sink},
};

/// Emits every record through a `slog::Logger`.
#[derive(Clone, Debug)]
pub struct SlogSink {
    logger: slog::Logger,
}

impl SlogSink {
    pub fn new(logger: slog::Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &slog::Logger {
        &self.logger
    }
}

impl Sink for SlogSink {
    fn log(&self, record: &Record<'_>) {
        let fields = MetadataKv(record.metadata);
        match record.level {
            Level::Error => slog::error!(self.logger, "{}", record.message; fields),
            Level::Warn => slog::warn!(self.logger, "{}", record.message; fields),
            Level::Info => slog::info!(self.logger, "{}", record.message; fields),
            Level::Debug => slog::debug!(self.logger, "{}", record.message; fields),
        }
    }

    fn enabled(&self, level: Level) -> bool {
        Drain::is_enabled(&self.logger, level.into())
    }
}

impl From<Level> for slog::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Self::Error,
            Level::Warn => Self::Warning,
            Level::Info => Self::Info,
            Level::Debug => Self::Debug,
        }
    }
}

impl From<slog::Level> for Level {
    fn from(level: slog::Level) -> Self {
        match level {
            slog::Level::Critical | slog::Level::Error => Self::Error,
            slog::Level::Warning => Self::Warn,
            slog::Level::Info => Self::Info,
            slog::Level::Debug | slog::Level::Trace => Self::Debug,
        }
    }
}

/// Sanitized metadata viewed as slog key-value pairs.
pub struct MetadataKv<'a>(pub &'a Map<String, Value>);

impl KV for MetadataKv<'_> {
    fn serialize(&self, record: &SlogRecord<'_>, serializer: &mut dyn Serializer) -> SlogResult {
        for (name, value) in self.0 {
            let key = Key::from(name.clone());
            match value {
                Value::Null => serializer.emit_none(key)?,
                Value::Bool(flag) => serializer.emit_bool(key, *flag)?,
                Value::String(text) => serializer.emit_str(key, text)?,
                Value::Number(number) => {
                    if let Some(n) = number.as_u64() {
                        serializer.emit_u64(key, n)?;
                    } else if let Some(n) = number.as_i64() {
                        serializer.emit_i64(key, n)?;
                    } else if let Some(n) = number.as_f64() {
                        serializer.emit_f64(key, n)?;
                    } else {
                        serializer.emit_str(key, &number.to_string())?;
                    }
                }
                nested => {
                    SlogValue::serialize(&slog::Serde(nested.clone()), record, key, serializer)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn levels_map_both_ways() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug] {
            assert_eq!(Level::from(slog::Level::from(level)), level);
        }
        assert_eq!(slog::Level::from(Level::Warn), slog::Level::Warning);
        assert_eq!(Level::from(slog::Level::Critical), Level::Error);
        assert_eq!(Level::from(slog::Level::Trace), Level::Debug);
    }
}

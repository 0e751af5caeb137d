//! Logger options, their validation, and the resolved sanitizer settings.
//!
//! [`LoggerOptions`] is the user-facing record. It deserializes from any serde
//! format with camelCase keys and defaults for every missing field:
//!
//! ```rust
//! use logmask::{Level, LoggerOptions};
//!
//! let options: LoggerOptions =
//!     serde_json::from_str(r#"{"context": "Billing", "blockList": ["card"]}"#).unwrap();
//! assert_eq!(options.context, "Billing");
//! assert_eq!(options.log_level, Level::Info);
//! assert_eq!(options.visible_chars, 4);
//! ```

use std::{env, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, ParseLevelError},
    sanitize::{BlockList, SafeSerializer, ELLIPSIS},
};

/// Environment variable that overrides [`LoggerOptions::log_level`].
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Largest accepted `maximum_depth`. Serialization recurses once per level.
pub const MAX_DEPTH: usize = 1024;

/// Record severity, most severe first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// True when a record at `self` passes a `threshold` filter.
    pub fn is_enabled_at(self, threshold: Self) -> bool {
        self <= threshold
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

/// Options recognized by [`crate::Logger`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerOptions {
    /// Label prefixed to every message as `"<context>: <message>"`.
    pub context: String,
    /// Passed through to the sink.
    pub log_level: Level,
    /// Trailing characters left visible by masking.
    pub visible_chars: usize,
    /// Upper bound on the number of `*` in a masked value.
    pub max_masked_chars: usize,
    /// Strings longer than this are truncated.
    pub max_log_value_length: usize,
    pub maximum_depth: usize,
    pub maximum_breadth: usize,
    /// Replaces back-references to ancestor containers.
    #[serde(alias = "circularValuePlaceholder")]
    pub circular_value: String,
    /// Sort object keys during serialization.
    pub deterministic: bool,
    /// Attached to every record under the `service` key.
    pub service: String,
    /// Field-name fragments whose values are masked.
    #[serde(alias = "blackList")]
    pub block_list: Vec<String>,
    /// Human-readable rendering instead of JSON lines. Only sinks look at it.
    pub development_format: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            context: String::new(),
            log_level: Level::Info,
            visible_chars: 4,
            max_masked_chars: 8,
            max_log_value_length: 100,
            maximum_depth: 4,
            maximum_breadth: 50,
            circular_value: "Circular".to_owned(),
            deterministic: false,
            service: String::new(),
            block_list: Vec::new(),
            development_format: false,
        }
    }
}

impl LoggerOptions {
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    #[must_use]
    pub fn with_visible_chars(mut self, visible_chars: usize) -> Self {
        self.visible_chars = visible_chars;
        self
    }

    #[must_use]
    pub fn with_max_masked_chars(mut self, max_masked_chars: usize) -> Self {
        self.max_masked_chars = max_masked_chars;
        self
    }

    #[must_use]
    pub fn with_max_log_value_length(mut self, max_log_value_length: usize) -> Self {
        self.max_log_value_length = max_log_value_length;
        self
    }

    #[must_use]
    pub fn with_maximum_depth(mut self, maximum_depth: usize) -> Self {
        self.maximum_depth = maximum_depth;
        self
    }

    #[must_use]
    pub fn with_maximum_breadth(mut self, maximum_breadth: usize) -> Self {
        self.maximum_breadth = maximum_breadth;
        self
    }

    #[must_use]
    pub fn with_circular_value(mut self, circular_value: impl Into<String>) -> Self {
        self.circular_value = circular_value.into();
        self
    }

    #[must_use]
    pub fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    #[must_use]
    pub fn with_block_list<I, S>(mut self, block_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block_list = block_list.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_development_format(mut self, development_format: bool) -> Self {
        self.development_format = development_format;
        self
    }

    /// Applies `LOG_LEVEL` from the environment when it is set and non-empty.
    pub fn with_env_overrides(self) -> Result<Self, ParseLevelError> {
        self.with_level_override(env::var(LOG_LEVEL_ENV).ok().as_deref())
    }

    pub(crate) fn with_level_override(
        mut self,
        value: Option<&str>,
    ) -> Result<Self, ParseLevelError> {
        if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
            self.log_level = value.parse()?;
        }
        Ok(self)
    }

    /// Rejects settings under which serialization or truncation is meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maximum_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.maximum_depth > MAX_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                max: MAX_DEPTH,
                got: self.maximum_depth,
            });
        }
        if self.maximum_breadth == 0 {
            return Err(ConfigError::ZeroBreadth);
        }
        if self.max_log_value_length < ELLIPSIS.len() {
            return Err(ConfigError::ValueLengthTooShort {
                min: ELLIPSIS.len(),
                got: self.max_log_value_length,
            });
        }
        Ok(())
    }

    /// The sanitization subset of these options.
    pub fn sanitizer_config(&self) -> SanitizerConfig {
        SanitizerConfig {
            visible_chars: self.visible_chars,
            max_masked_chars: self.max_masked_chars,
            max_log_value_length: self.max_log_value_length,
            maximum_depth: self.maximum_depth,
            maximum_breadth: self.maximum_breadth,
            circular_value: self.circular_value.clone(),
            deterministic: self.deterministic,
            block_list: BlockList::new(&self.block_list),
        }
    }
}

/// Settings for one sanitization pass: serialization bounds plus masking rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizerConfig {
    pub visible_chars: usize,
    pub max_masked_chars: usize,
    pub max_log_value_length: usize,
    pub maximum_depth: usize,
    pub maximum_breadth: usize,
    pub circular_value: String,
    pub deterministic: bool,
    pub block_list: BlockList,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        LoggerOptions::default().sanitizer_config()
    }
}

impl SanitizerConfig {
    pub fn serializer(&self) -> SafeSerializer<'_> {
        SafeSerializer::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Level, LoggerOptions, MAX_DEPTH};
    use crate::error::ConfigError;

    #[test]
    fn defaults_match_documented_values() {
        let options = LoggerOptions::default();
        assert_eq!(options.context, "");
        assert_eq!(options.log_level, Level::Info);
        assert_eq!(options.visible_chars, 4);
        assert_eq!(options.max_masked_chars, 8);
        assert_eq!(options.max_log_value_length, 100);
        assert_eq!(options.maximum_depth, 4);
        assert_eq!(options.maximum_breadth, 50);
        assert_eq!(options.circular_value, "Circular");
        assert!(!options.deterministic);
        assert_eq!(options.service, "");
        assert!(options.block_list.is_empty());
        assert!(!options.development_format);
    }

    #[test]
    fn deserializes_camel_case_with_defaults_and_aliases() {
        let options: LoggerOptions = serde_json::from_str(
            r#"{
                "context": "MyService",
                "logLevel": "debug",
                "visibleChars": 3,
                "maxMaskedChars": 10,
                "circularValuePlaceholder": "[CircularRef]",
                "blackList": ["abc"]
            }"#,
        )
        .unwrap();
        assert_eq!(options.context, "MyService");
        assert_eq!(options.log_level, Level::Debug);
        assert_eq!(options.visible_chars, 3);
        assert_eq!(options.max_masked_chars, 10);
        assert_eq!(options.circular_value, "[CircularRef]");
        assert_eq!(options.block_list, vec!["abc"]);
        assert_eq!(options.maximum_breadth, 50);
    }

    #[test]
    fn level_parsing_is_case_insensitive() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" warning ".parse::<Level>().unwrap(), Level::Warn);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn level_ordering_filters_less_severe_records() {
        assert!(Level::Error.is_enabled_at(Level::Info));
        assert!(Level::Info.is_enabled_at(Level::Info));
        assert!(!Level::Debug.is_enabled_at(Level::Info));
    }

    #[test]
    fn level_override_ignores_empty_values() {
        let options = LoggerOptions::default();
        let options = options.with_level_override(Some("")).unwrap();
        assert_eq!(options.log_level, Level::Info);
        let options = options.with_level_override(Some("error")).unwrap();
        assert_eq!(options.log_level, Level::Error);
        assert!(options.with_level_override(Some("loud")).is_err());
    }

    #[test]
    fn validation_rejects_degenerate_bounds() {
        assert_eq!(
            LoggerOptions::default().with_maximum_depth(0).validate(),
            Err(ConfigError::ZeroDepth)
        );
        assert_eq!(
            LoggerOptions::default().with_maximum_breadth(0).validate(),
            Err(ConfigError::ZeroBreadth)
        );
        assert_eq!(
            LoggerOptions::default()
                .with_max_log_value_length(2)
                .validate(),
            Err(ConfigError::ValueLengthTooShort { min: 3, got: 2 })
        );
        assert!(LoggerOptions::default().validate().is_ok());
    }

    #[test]
    fn validation_caps_the_depth() {
        assert_eq!(
            LoggerOptions::default()
                .with_maximum_depth(MAX_DEPTH + 1)
                .validate(),
            Err(ConfigError::DepthTooLarge {
                max: 1024,
                got: 1025
            })
        );
        assert!(LoggerOptions::default()
            .with_maximum_depth(MAX_DEPTH)
            .validate()
            .is_ok());
        assert_eq!(
            ConfigError::DepthTooLarge { max: 1024, got: 5000 }.to_string(),
            "maximumDepth must be at most 1024, got 5000"
        );
    }

    #[test]
    fn sanitizer_config_normalizes_block_list() {
        let config = LoggerOptions::default()
            .with_block_list(["Token", "token"])
            .sanitizer_config();
        assert_eq!(config.block_list.entries(), ["token"]);
    }
}

//! Configuration schema definitions.
//!
//! ```toml
//! prefix = "!"
//!
//! [system]
//! ignore_bots = true
//! run_in_dm = true
//! send_errors = true
//! escape_everyone = true
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! output = "stdout"
//!
//! [logging.filters]
//! bronze_framework = "debug"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BronzeConfig {
    /// Text prefix for commands. Empty disables prefix invocation, leaving
    /// mentions and private messages.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Dispatch behaviour.
    #[serde(default)]
    pub system: SystemConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for BronzeConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            system: SystemConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Dispatch behaviour of the root container and the response sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Ignore messages authored by bots.
    #[serde(default = "default_true")]
    pub ignore_bots: bool,

    /// Accept commands in private channels.
    #[serde(default = "default_true")]
    pub run_in_dm: bool,

    /// Tell users when a command fails unexpectedly.
    #[serde(default = "default_true")]
    pub send_errors: bool,

    /// Escape `@everyone`/`@here` in error text sent back.
    #[serde(default = "default_true")]
    pub escape_everyone: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            ignore_bots: true,
            run_in_dm: true,
            send_errors: true,
            escape_everyone: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used with `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Log file rotation.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Per-module level overrides, e.g. `bronze_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Span lifecycle events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            rotation: LogRotation::default(),
            filters: HashMap::new(),
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

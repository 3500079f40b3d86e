// In: src/config.rs

//! The single source of truth for all loader configuration.
//!
//! `LoaderConfig` is created once at the application boundary (for example
//! from a JSON file) and passed by reference into the loader. Every field has
//! a serde default, so an empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::SmlmError;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// Which table decoding strategy the loader should use.
///
/// Both strategies produce bit-identical columns; the choice only affects
/// throughput. The decision is made once, when the loader is built.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStrategy {
    /// **Default:** Use the strided-view decoder when the `ndarray` feature is
    /// compiled in, and fall back to sequential unpacking otherwise.
    #[default]
    Auto,

    /// Always use zero-copy strided views. Falls back to sequential unpacking
    /// with a warning if the `ndarray` feature is disabled.
    StridedView,

    /// Always unpack row by row.
    SequentialUnpack,
}

/// What the loader does when one entry fails for a reason other than its
/// payload being absent from the archive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryFailurePolicy {
    /// **Default:** Abort the whole load with `SmlmError::EntryFailed`.
    #[default]
    Abort,

    /// Log the failure, leave the entry without data, and continue.
    Skip,
}

/// Logging settings consumed by `observability::init_logging`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Minimum level to emit: `error`, `warn`, `info`, `debug` or `trace`.
    /// The `RUST_LOG` environment variable, when set, takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Append log lines to this file instead of writing to stderr.
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "error".to_string()
}

//==================================================================================
// II. The Unified LoaderConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LoaderConfig {
    /// Table decoding strategy.
    #[serde(default)]
    pub decode_strategy: DecodeStrategy,

    /// Policy for entry-level failures such as an unsupported format mode.
    #[serde(default)]
    pub entry_failure: EntryFailurePolicy,

    /// If false, image entries are listed but their payloads are not read.
    #[serde(default = "default_true")]
    pub decode_images: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            decode_strategy: DecodeStrategy::default(),
            entry_failure: EntryFailurePolicy::default(),
            decode_images: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SmlmError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

//! Logging setup and structured diagnostics for the loader.
//!
//! The library itself only talks to the `log` facade. Binaries and tests that
//! want to see the output call `init_logging` once; subsequent calls are no-ops.
//! The `log_metric!` macro emits a single structured line at `debug` level,
//! used by the decoders to report layouts and throughput-relevant sizes.

use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};
use std::sync::Once;

use colored::Colorize;
use log::Level;

use crate::config::LoggingConfig;
use crate::error::SmlmError;

/// Logs a structured key-value metric line at `debug` level.
///
/// # Example
/// ```
/// use smlm_loader::log_metric;
/// let stride = 17;
/// log_metric!("event" = "decode_table", "stride" = &stride);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("{}={}", $key, $value));
            )+
            $crate::__log::debug!("SMLM_METRIC: {}", parts.join(" "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend configured from `config`.
///
/// `RUST_LOG`, when set, overrides `config.level`. Only the first successful
/// call has an effect.
pub fn init_logging(config: &LoggingConfig) -> Result<(), SmlmError> {
    let file = match &config.log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };
    let level = config.level.clone();

    INIT_LOGGER.call_once(move || {
        let env = env_logger::Env::default().default_filter_or(level);
        let mut builder = env_logger::Builder::from_env(env);
        let colorize = colorize_output(file.is_some(), std::io::stderr().is_terminal());

        // Custom formatter: just print the level and message
        builder.format(move |buf, record| {
            let tag = format!("[{}]", record.level());
            if colorize {
                writeln!(buf, "{} {}", paint(record.level(), &tag), record.args())
            } else {
                writeln!(buf, "{} {}", tag, record.args())
            }
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}

/// Level tags are colored only when lines go straight to an interactive stderr.
fn colorize_output(writes_to_file: bool, stderr_is_terminal: bool) -> bool {
    !writes_to_file && stderr_is_terminal
}

fn paint(level: Level, tag: &str) -> colored::ColoredString {
    match level {
        Level::Error => tag.red().bold(),
        Level::Warn => tag.yellow(),
        Level::Info => tag.green(),
        Level::Debug => tag.blue(),
        Level::Trace => tag.dimmed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LoggingConfig::default();
        init_logging(&config).unwrap();
        init_logging(&config).unwrap();
        log_metric!("event" = "test", "value" = 1);
    }

    #[test]
    fn test_color_only_on_interactive_stderr() {
        assert!(colorize_output(false, true));
        assert!(!colorize_output(false, false));
        assert!(!colorize_output(true, true));
        assert!(!colorize_output(true, false));
    }

    #[test]
    fn test_init_logging_reports_unopenable_file() {
        let config = LoggingConfig {
            level: "info".to_string(),
            log_file: Some("/nonexistent-dir/smlm/loader.log".to_string()),
        };
        assert!(matches!(init_logging(&config), Err(SmlmError::Io(_))));
    }
}

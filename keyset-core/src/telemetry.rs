//! `tracing` subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::typed::section_key;
use crate::config::{ConfigError, ConfigProperties, KeysetConfig};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

/// Logging section, read from `keyset.log.*`.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl ConfigProperties for LogConfig {
    fn prefix() -> &'static str {
        "keyset.log"
    }

    fn from_config(config: &KeysetConfig) -> Result<Self, ConfigError> {
        let defaults = LogConfig::default();
        let level = config.get_or(&section_key(Self::prefix(), "level"), defaults.level)?;
        let format_key = section_key(Self::prefix(), "format");
        let format = match config.get::<String>(&format_key) {
            Ok(raw) => raw
                .parse()
                .map_err(|message| ConfigError::Invalid { key: format_key, message })?,
            Err(ConfigError::NotFound(_)) => defaults.format,
            Err(e) => return Err(e),
        };
        Ok(Self { level, format })
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over [`LogConfig::level`]. Returns `false` when a
/// subscriber was already installed (e.g. by another test in the same binary).
pub fn init_tracing(config: &LogConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false);

            Registry::default()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .is_ok()
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false);

            Registry::default()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .is_ok()
        }
    }
}

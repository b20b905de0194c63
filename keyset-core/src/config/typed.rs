use super::{ConfigError, KeysetConfig};

/// Trait for strongly-typed configuration sections.
///
/// ```ignore
/// pub struct LogConfig { pub level: String }
///
/// impl ConfigProperties for LogConfig {
///     fn prefix() -> &'static str { "keyset.log" }
///
///     fn from_config(config: &KeysetConfig) -> Result<Self, ConfigError> {
///         Ok(Self { level: config.get_or("keyset.log.level", "info".to_string())? })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"keyset.pagination"`).
    fn prefix() -> &'static str;

    /// Construct from a `KeysetConfig` instance. Missing keys fall back to defaults.
    fn from_config(config: &KeysetConfig) -> Result<Self, ConfigError>;

    /// Build the section from an empty config, i.e. all defaults.
    fn defaults() -> Result<Self, ConfigError> {
        Self::from_config(&KeysetConfig::empty())
    }
}

/// Join a section prefix and a relative key.
pub fn section_key(prefix: &str, key: &str) -> String {
    format!("{prefix}.{key}")
}

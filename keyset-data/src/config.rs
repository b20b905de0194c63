use keyset_core::config::typed::section_key;
use keyset_core::{ConfigError, ConfigProperties, KeysetConfig};

use crate::query::Dialect;

/// Engine settings, read from `keyset.pagination.*`.
///
/// ```yaml
/// keyset:
///   pagination:
///     max_page_size: 1000
///     dialect: postgres
///     row_values: true
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    /// Largest accepted `first`/`last`. Larger requests are rejected, not clamped.
    pub max_page_size: u32,
    pub dialect: Dialect,
    /// Use native `(a, b) > (x, y)` comparisons when the dialect has them.
    pub row_values: bool,
}

pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            dialect: Dialect::Generic,
            row_values: true,
        }
    }
}

impl PaginationConfig {
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn with_row_values(mut self, row_values: bool) -> Self {
        self.row_values = row_values;
        self
    }

    /// Whether seek predicates should use a native row-value comparison.
    pub fn native_row_values(&self) -> bool {
        self.row_values && self.dialect.supports_row_values()
    }
}

impl ConfigProperties for PaginationConfig {
    fn prefix() -> &'static str {
        "keyset.pagination"
    }

    fn from_config(config: &KeysetConfig) -> Result<Self, ConfigError> {
        let defaults = PaginationConfig::default();
        let key = |k: &str| section_key(Self::prefix(), k);

        let max_page_size = config.get_or(&key("max_page_size"), defaults.max_page_size)?;
        if max_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: key("max_page_size"),
                message: "must be at least 1".to_string(),
            });
        }

        let dialect = match config.get::<String>(&key("dialect")) {
            Ok(raw) => raw.parse().map_err(|message| ConfigError::Invalid {
                key: key("dialect"),
                message,
            })?,
            Err(ConfigError::NotFound(_)) => defaults.dialect,
            Err(e) => return Err(e),
        };

        let row_values = config.get_or(&key("row_values"), defaults.row_values)?;

        Ok(Self {
            max_page_size,
            dialect,
            row_values,
        })
    }
}

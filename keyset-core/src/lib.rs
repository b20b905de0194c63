//! # keyset-core
//!
//! Ambient pieces shared by every keyset crate:
//!
//! - [`config`]: layered configuration (`application.yaml`, profile overrides,
//!   `.env` files, environment variables) with typed sections.
//! - [`telemetry`]: `tracing` subscriber installation driven by [`LogConfig`].

pub mod config;
pub mod telemetry;

pub use config::{ConfigError, ConfigProperties, ConfigValue, FromConfigValue, KeysetConfig};
pub use telemetry::{init_tracing, LogConfig, LogFormat};

pub mod prelude {
    //! Re-exports of the most commonly used core types.
    pub use crate::{ConfigProperties, KeysetConfig, LogConfig};
}

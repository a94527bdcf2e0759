//! Configuration management
//!
//! Settings are merged from `config/default.toml`, `config/{environment}.toml`,
//! `config/local.toml` and `LIBRIS_*` environment variables, in that order.
//! See [`ConfigLoader`] for the details.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, DatabaseConfig, JwtConfig, LoggerSettings, SeedConfig, ServerConfig,
    Settings,
};

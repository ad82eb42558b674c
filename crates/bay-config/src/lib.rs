//! # bay-config
//!
//! Configuration for the Bay device layer: the `bay.toml` schema, a
//! loader with environment-variable overrides, and validation. The
//! storage backend (file-based SQLite vs. networked Postgres) is selected
//! here, at startup, by explicit configuration.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{BayConfig, ConfigWarning, LoggingConfig, StorageConfig, WarningSeverity};

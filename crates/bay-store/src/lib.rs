//! # bay-store
//!
//! Persistence for device configuration records. The registry treats this
//! as an opaque record store: load and save a configuration bag keyed by
//! device id. Two interchangeable backends are provided: a file-based
//! SQLite store for single-process use, and a networked Postgres store
//! (behind the `postgres` feature) for shared deployments. Which one runs
//! is decided by configuration at startup; dispatch logic never knows.

pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use bay_core::{BayError, DeviceId, Result};

pub use sqlite::SqliteStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

/// A stored device configuration record.
#[derive(Debug, Clone)]
pub struct ConfigRecord {
    pub device_id: DeviceId,
    pub device_type: String,
    pub config: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The narrow interface the registry consumes.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the configuration saved for a device, if any.
    async fn load(&self, device_id: &DeviceId) -> Result<Option<Map<String, Value>>>;

    /// Save (upsert) a device's configuration.
    async fn save(
        &self,
        device_id: &DeviceId,
        device_type: &str,
        config: &Map<String, Value>,
    ) -> Result<()>;

    /// Delete a device's record. Returns whether a record existed.
    async fn delete(&self, device_id: &DeviceId) -> Result<bool>;

    /// List stored records, optionally filtered by device type.
    async fn list(&self, device_type: Option<&str>) -> Result<Vec<ConfigRecord>>;
}

/// Open the store selected by configuration.
///
/// Selection is an explicit match on the configured backend name, never
/// runtime type inspection. Both backends satisfy [`ConfigStore`]
/// identically from the caller's perspective.
pub async fn open(config: &bay_config::BayConfig) -> Result<Arc<dyn ConfigStore>> {
    match config.storage.backend.as_str() {
        "sqlite" => Ok(Arc::new(SqliteStore::open(&config.sqlite_path())?)),
        #[cfg(feature = "postgres")]
        "postgres" => {
            let url = config.storage.url.as_deref().ok_or_else(|| {
                BayError::Config("postgres backend selected but no connection URL set".into())
            })?;
            Ok(Arc::new(
                PostgresStore::connect(url, config.storage.pool_size).await?,
            ))
        }
        #[cfg(not(feature = "postgres"))]
        "postgres" => Err(BayError::Config(
            "postgres backend requires building with the 'postgres' feature".into(),
        )),
        other => Err(BayError::Config(format!("unknown storage backend: {other}"))),
    }
}

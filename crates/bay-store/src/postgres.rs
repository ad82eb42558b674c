//! PostgreSQL backend for the device configuration store.
//!
//! Functionally equivalent to [`crate::SqliteStore`]; the registry cannot
//! tell them apart. Intended for deployments where several agent runtimes
//! share one record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, Pool, Runtime};
use serde_json::{Map, Value};
use tokio_postgres::NoTls;
use tracing::info;

use bay_core::{BayError, DeviceId, Result};

use crate::{ConfigRecord, ConfigStore};

/// Networked relational device configuration store.
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    /// Connect to the database and ensure the schema exists.
    pub async fn connect(url: &str, pool_size: usize) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.url = Some(url.to_string());
        cfg.pool = Some(deadpool_postgres::PoolConfig {
            max_size: pool_size,
            ..Default::default()
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| BayError::Storage(e.to_string()))?;

        let conn = pool
            .get()
            .await
            .map_err(|e| BayError::Storage(e.to_string()))?;
        conn.batch_execute(
            "CREATE TABLE IF NOT EXISTS device_configs (
                device_id UUID PRIMARY KEY,
                device_type TEXT NOT NULL,
                config JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_device_configs_type ON device_configs(device_type);",
        )
        .await
        .map_err(|e| BayError::Storage(e.to_string()))?;

        info!(pool_size, "connected to postgres device config store");
        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| BayError::Storage(e.to_string()))
    }
}

#[async_trait]
impl ConfigStore for PostgresStore {
    async fn load(&self, device_id: &DeviceId) -> Result<Option<Map<String, Value>>> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "SELECT config FROM device_configs WHERE device_id = $1",
                &[device_id],
            )
            .await
            .map_err(|e| BayError::Storage(e.to_string()))?;

        match row {
            Some(row) => match row.get::<_, Value>(0) {
                Value::Object(config) => Ok(Some(config)),
                _ => Err(BayError::Storage(format!(
                    "malformed config record for device {device_id}"
                ))),
            },
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        device_id: &DeviceId,
        device_type: &str,
        config: &Map<String, Value>,
    ) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO device_configs (device_id, device_type, config)
             VALUES ($1, $2, $3)
             ON CONFLICT (device_id) DO UPDATE SET
                device_type = EXCLUDED.device_type,
                config = EXCLUDED.config,
                updated_at = NOW()",
            &[device_id, &device_type, &Value::Object(config.clone())],
        )
        .await
        .map_err(|e| BayError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, device_id: &DeviceId) -> Result<bool> {
        let conn = self.conn().await?;
        let rows = conn
            .execute(
                "DELETE FROM device_configs WHERE device_id = $1",
                &[device_id],
            )
            .await
            .map_err(|e| BayError::Storage(e.to_string()))?;
        Ok(rows > 0)
    }

    async fn list(&self, device_type: Option<&str>) -> Result<Vec<ConfigRecord>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT device_id, device_type, config, created_at, updated_at
                 FROM device_configs
                 WHERE $1::TEXT IS NULL OR device_type = $1
                 ORDER BY created_at",
                &[&device_type],
            )
            .await
            .map_err(|e| BayError::Storage(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let config = match row.get::<_, Value>(2) {
                Value::Object(config) => config,
                _ => continue,
            };
            records.push(ConfigRecord {
                device_id: row.get(0),
                device_type: row.get(1),
                config,
                created_at: row.get::<_, DateTime<Utc>>(3),
                updated_at: row.get::<_, DateTime<Utc>>(4),
            });
        }
        Ok(records)
    }
}

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};
use tracing::{info, warn};

use bay_core::{BayError, DeviceId, Result};

use crate::{ConfigRecord, ConfigStore};

/// File-based, single-process device configuration store.
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        info!(?path, "opening device config store");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| BayError::Storage(e.to_string()))?;

        // Enable WAL mode for concurrent reads
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| BayError::Storage(e.to_string()))?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS device_configs (
                device_id TEXT PRIMARY KEY,
                device_type TEXT NOT NULL,
                config TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_device_configs_type ON device_configs(device_type);
            ",
        )
        .map_err(|e| BayError::Storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        Self::open(Path::new(":memory:"))
    }
}

#[async_trait]
impl ConfigStore for SqliteStore {
    async fn load(&self, device_id: &DeviceId) -> Result<Option<Map<String, Value>>> {
        let json: Option<String> = {
            let db = self.db.lock();
            db.query_row(
                "SELECT config FROM device_configs WHERE device_id = ?1",
                rusqlite::params![device_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| BayError::Storage(e.to_string()))?
        };

        match json {
            Some(j) => {
                let config: Map<String, Value> = serde_json::from_str(&j)?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        device_id: &DeviceId,
        device_type: &str,
        config: &Map<String, Value>,
    ) -> Result<()> {
        let json = serde_json::to_string(config)?;
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock();
        db.execute(
            "INSERT INTO device_configs (device_id, device_type, config, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(device_id) DO UPDATE SET
                device_type = excluded.device_type,
                config = excluded.config,
                updated_at = excluded.updated_at",
            rusqlite::params![device_id.to_string(), device_type, json, now],
        )
        .map_err(|e| BayError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, device_id: &DeviceId) -> Result<bool> {
        let db = self.db.lock();
        let rows = db
            .execute(
                "DELETE FROM device_configs WHERE device_id = ?1",
                rusqlite::params![device_id.to_string()],
            )
            .map_err(|e| BayError::Storage(e.to_string()))?;
        Ok(rows > 0)
    }

    async fn list(&self, device_type: Option<&str>) -> Result<Vec<ConfigRecord>> {
        let rows: Vec<(String, String, String, String, String)> = {
            let db = self.db.lock();
            let mut stmt = db
                .prepare(
                    "SELECT device_id, device_type, config, created_at, updated_at
                     FROM device_configs
                     WHERE ?1 IS NULL OR device_type = ?1
                     ORDER BY created_at",
                )
                .map_err(|e| BayError::Storage(e.to_string()))?;
            stmt.query_map(rusqlite::params![device_type], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .map_err(|e| BayError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect()
        };

        let mut records = Vec::with_capacity(rows.len());
        for (id, device_type, json, created_at, updated_at) in rows {
            let Ok(device_id) = id.parse::<DeviceId>() else {
                warn!(id, "skipping config record with malformed device id");
                continue;
            };
            let Ok(config) = serde_json::from_str::<Map<String, Value>>(&json) else {
                warn!(id, "skipping config record with malformed config json");
                continue;
            };
            records.push(ConfigRecord {
                device_id,
                device_type,
                config,
                created_at: parse_timestamp(&created_at),
                updated_at: parse_timestamp(&updated_at),
            });
        }
        Ok(records)
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

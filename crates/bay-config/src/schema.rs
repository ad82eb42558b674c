use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration — maps to `bay.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BayConfig {
    /// Directory for on-disk state (databases, per-device scratch).
    pub data_dir: PathBuf,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Default for BayConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bay")
        .join("data")
}

// ── Storage ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend: "sqlite" (file-based, single process) or
    /// "postgres" (networked, shared).
    pub backend: String,
    /// SQLite database file. Relative paths resolve under `data_dir`.
    pub db_path: PathBuf,
    /// Postgres connection URL (postgres backend only).
    pub url: Option<String>,
    /// Connection pool size (postgres backend only).
    pub pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".into(),
            db_path: PathBuf::from("devices.db"),
            url: None,
            pool_size: 8,
        }
    }
}

impl BayConfig {
    /// Absolute path of the SQLite database file.
    pub fn sqlite_path(&self) -> PathBuf {
        if self.storage.db_path.is_absolute() {
            self.storage.db_path.clone()
        } else {
            self.data_dir.join(&self.storage.db_path)
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, " ({h})")?;
        }
        Ok(())
    }
}

impl BayConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        match self.storage.backend.as_str() {
            "sqlite" => {
                if self.storage.db_path.as_os_str().is_empty() {
                    warnings.push(ConfigWarning {
                        field: "storage.db_path".into(),
                        message: "db_path is empty".into(),
                        severity: WarningSeverity::Error,
                        hint: Some("set to e.g. 'devices.db'".into()),
                    });
                }
            }
            "postgres" => {
                if self.storage.url.as_deref().unwrap_or("").is_empty() {
                    warnings.push(ConfigWarning {
                        field: "storage.url".into(),
                        message: "postgres backend selected but no connection URL set".into(),
                        severity: WarningSeverity::Error,
                        hint: Some("set to e.g. 'postgres://bay@localhost/bay'".into()),
                    });
                }
                if self.storage.pool_size == 0 {
                    warnings.push(ConfigWarning {
                        field: "storage.pool_size".into(),
                        message: "pool_size is 0 — no connections can be made".into(),
                        severity: WarningSeverity::Error,
                        hint: Some("set to e.g. 8".into()),
                    });
                }
            }
            other => {
                warnings.push(ConfigWarning {
                    field: "storage.backend".into(),
                    message: format!("unknown backend '{other}'"),
                    severity: WarningSeverity::Error,
                    hint: Some("valid backends: sqlite, postgres".into()),
                });
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("valid levels: {}", valid_levels.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| w.to_string())
            .collect();
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors.join("\n"))
        }
    }
}

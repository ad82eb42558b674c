use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::schema::BayConfig;

/// Loads the Bay configuration from disk and environment.
pub struct ConfigLoader {
    config: Arc<RwLock<BayConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > BAY_CONFIG env > ~/.bay/bay.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("BAY_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bay")
            .join("bay.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> bay_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str::<BayConfig>(&raw).map_err(|e| {
                bay_core::BayError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            BayConfig::default()
        };

        // Apply environment variable overrides
        let config = Self::apply_env_overrides(config);

        // Validate config — log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(bay_core::BayError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> BayConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<BayConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (BAY_DATA_DIR, BAY_STORAGE_BACKEND, etc.)
    fn apply_env_overrides(mut config: BayConfig) -> BayConfig {
        if let Ok(v) = std::env::var("BAY_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("BAY_STORAGE_BACKEND") {
            config.storage.backend = v;
        }
        if let Ok(v) = std::env::var("BAY_DB_PATH") {
            config.storage.db_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("BAY_LOG_LEVEL") {
            config.logging.level = v;
        }
        // Connection URL: env var fills in when the config file doesn't
        // have one set. Config file takes priority, env is the fallback.
        if config.storage.url.is_none() {
            if let Ok(v) = std::env::var("BAY_DB_URL") {
                config.storage.url = Some(v);
            }
        }
        // Test runs get a throwaway database name so suites never collide
        // with a developer's real device records.
        if std::env::var("BAY_DB_TEST").as_deref() == Ok("true") {
            let ts = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            config.storage.db_path = PathBuf::from(format!("devices_test_{ts}.db"));
        }
        config
    }

    /// Reload the config from disk.
    pub fn reload(&self) -> bay_core::Result<()> {
        if !self.config_path.exists() {
            return Err(bay_core::BayError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.config_path)?;
        let new_config = toml::from_str::<BayConfig>(&raw).map_err(|e| {
            bay_core::BayError::Config(format!(
                "failed to parse {}: {}",
                self.config_path.display(),
                e
            ))
        })?;
        let new_config = Self::apply_env_overrides(new_config);
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}

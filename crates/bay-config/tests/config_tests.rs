#[cfg(test)]
mod tests {
    use bay_config::schema::*;
    use bay_config::ConfigLoader;
    use std::io::Write;
    use std::path::PathBuf;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_bay_config_defaults() {
        let config = BayConfig::default();
        assert_eq!(config.storage.backend, "sqlite");
        assert_eq!(config.storage.db_path, PathBuf::from("devices.db"));
        assert!(config.storage.url.is_none());
        assert_eq!(config.storage.pool_size, 8);
        assert_eq!(config.logging.level, "info");
        assert!(config.data_dir.ends_with("data"));
    }

    #[test]
    fn test_sqlite_path_resolves_under_data_dir() {
        let mut config = BayConfig::default();
        config.data_dir = PathBuf::from("/var/lib/bay");
        assert_eq!(config.sqlite_path(), PathBuf::from("/var/lib/bay/devices.db"));

        config.storage.db_path = PathBuf::from("/tmp/other.db");
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/other.db"));
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = BayConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: BayConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.storage.backend, config.storage.backend);
        assert_eq!(restored.logging.level, config.logging.level);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [storage]
            backend = "postgres"
            url = "postgres://bay@localhost/bay"
        "#;
        let config: BayConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.storage.backend, "postgres");
        assert_eq!(config.storage.pool_size, 8);
        assert_eq!(config.logging.level, "info");
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_validate_default_is_clean() {
        let config = BayConfig::default();
        let warnings = config.validate().unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_validate_unknown_backend_is_error() {
        let mut config = BayConfig::default();
        config.storage.backend = "mongodb".into();
        let err = config.validate().unwrap_err();
        assert!(err.contains("mongodb"));
    }

    #[test]
    fn test_validate_postgres_requires_url() {
        let mut config = BayConfig::default();
        config.storage.backend = "postgres".into();
        let err = config.validate().unwrap_err();
        assert!(err.contains("storage.url"));

        config.storage.url = Some("postgres://bay@localhost/bay".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_log_level_warns() {
        let mut config = BayConfig::default();
        config.logging.level = "loud".into();
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "logging.level");
        assert_eq!(warnings[0].severity, WarningSeverity::Warning);
    }

    // ── Loader tests ───────────────────────────────────────────

    #[test]
    fn test_loader_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            data_dir = "/tmp/bay-test"

            [logging]
            level = "debug"
            "#
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(file.path())).unwrap();
        let config = loader.get();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/bay-test"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(loader.path(), file.path());
    }

    #[test]
    fn test_loader_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let loader = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(loader.get().storage.backend, "sqlite");
    }

    #[test]
    fn test_loader_rejects_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [storage]
            backend = "postgres"
            "#
        )
        .unwrap();

        let result = ConfigLoader::load(Some(file.path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_loader_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bay.toml");
        std::fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();

        let loader = ConfigLoader::load(Some(&path)).unwrap();
        assert_eq!(loader.get().logging.level, "info");

        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();
        loader.reload().unwrap();
        assert_eq!(loader.get().logging.level, "warn");
    }
}

#[cfg(test)]
mod tests {
    use bay_store::{ConfigStore, SqliteStore};
    use serde_json::{json, Map, Value};
    use uuid::Uuid;

    fn config(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // ── Round-trip ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_save_then_load_returns_equal_config() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        let cfg = config(&[
            ("root", json!("/srv/agent")),
            ("create_missing", json!(true)),
            ("limits", json!({"max_bytes": 1048576})),
        ]);

        store.save(&id, "filesystem", &cfg).await.unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded, cfg);
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load(&Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_existing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();

        store
            .save(&id, "filesystem", &config(&[("root", json!("/old"))]))
            .await
            .unwrap();
        store
            .save(&id, "filesystem", &config(&[("root", json!("/new"))]))
            .await
            .unwrap();

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.get("root"), Some(&json!("/new")));

        let records = store.list(None).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    // ── Delete ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_delete() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();
        store
            .save(&id, "browser", &config(&[("headless", json!(true))]))
            .await
            .unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(store.load(&id).await.unwrap().is_none());
        // Deleting again reports no record.
        assert!(!store.delete(&id).await.unwrap());
    }

    // ── Listing ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_filters_by_device_type() {
        let store = SqliteStore::open_in_memory().unwrap();
        let fs_id = Uuid::new_v4();
        store
            .save(&fs_id, "filesystem", &config(&[("root", json!("/srv"))]))
            .await
            .unwrap();
        store
            .save(&Uuid::new_v4(), "browser", &config(&[]))
            .await
            .unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let fs_only = store.list(Some("filesystem")).await.unwrap();
        assert_eq!(fs_only.len(), 1);
        assert_eq!(fs_only[0].device_id, fs_id);
        assert_eq!(fs_only[0].device_type, "filesystem");
        assert_eq!(fs_only[0].config.get("root"), Some(&json!("/srv")));
    }

    // ── Durability ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.db");
        let id = Uuid::new_v4();
        let cfg = config(&[("root", json!("/srv/agent"))]);

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save(&id, "filesystem", &cfg).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded, cfg);
    }

    // ── Backend selection ──────────────────────────────────────

    #[tokio::test]
    async fn test_open_selects_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = bay_config::BayConfig::default();
        config.data_dir = dir.path().to_path_buf();

        let store = bay_store::open(&config).await.unwrap();
        let id = Uuid::new_v4();
        store
            .save(&id, "filesystem", &Map::new())
            .await
            .unwrap();
        assert!(store.load(&id).await.unwrap().is_some());
        assert!(dir.path().join("devices.db").exists());
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_backend() {
        let mut config = bay_config::BayConfig::default();
        config.storage.backend = "mongodb".into();
        assert!(bay_store::open(&config).await.is_err());
    }
}

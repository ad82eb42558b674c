#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Map, Value};

    use bay_core::BayError;
    use bay_device::{DeviceRegistry, DeviceState, MockFactory};
    use bay_store::{ConfigStore, SqliteStore};

    fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn registry() -> (DeviceRegistry, Arc<dyn ConfigStore>) {
        let store: Arc<dyn ConfigStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        (DeviceRegistry::new(Arc::clone(&store)), store)
    }

    // ── Registration ───────────────────────────────────────────

    #[tokio::test]
    async fn test_register_and_enumerate() {
        let (registry, _store) = registry();
        registry.register(Arc::new(MockFactory::new())).unwrap();
        assert_eq!(registry.device_types(), vec!["mock".to_string()]);

        let descriptor = registry.descriptor("mock").unwrap();
        assert!(descriptor.resolve("echo").is_some());
        assert!(registry.descriptor("teapot").is_err());
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let (registry, _store) = registry();
        registry.register(Arc::new(MockFactory::new())).unwrap();

        let err = registry
            .register(Arc::new(MockFactory::failing("never used")))
            .unwrap_err();
        assert!(matches!(err, BayError::DuplicateDeviceType(_)));

        // First registration intact: create still provisions successfully.
        let handle = registry.create("mock", Map::new()).await.unwrap();
        assert_eq!(handle.state(), DeviceState::Ready);
    }

    // ── Creation ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_unknown_type() {
        let (registry, _store) = registry();
        let err = registry.create("teapot", Map::new()).await.unwrap_err();
        assert!(matches!(err, BayError::UnknownDeviceType(_)));
    }

    #[tokio::test]
    async fn test_create_persists_configuration() {
        let (registry, store) = registry();
        registry.register(Arc::new(MockFactory::new())).unwrap();

        let config = args(&[("region", json!("eu-west")), ("verbose", json!(true))]);
        let handle = registry.create("mock", config.clone()).await.unwrap();
        assert_eq!(handle.state(), DeviceState::Ready);
        assert_eq!(handle.configuration(), &config);

        let stored = store.load(&handle.id()).await.unwrap().unwrap();
        assert_eq!(stored, config);
    }

    #[tokio::test]
    async fn test_create_provision_failure_surfaces_cause() {
        let (registry, store) = registry();
        registry
            .register(Arc::new(MockFactory::failing("quota exhausted")))
            .unwrap();

        let err = registry.create("mock", Map::new()).await.unwrap_err();
        match err {
            BayError::Provision { reason, .. } => assert!(reason.contains("quota exhausted")),
            other => panic!("expected Provision error, got {other}"),
        }
        // Nothing was persisted for the failed instance.
        assert!(store.list(None).await.unwrap().is_empty());
    }

    // ── Reconnect ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_reconnect_restores_id_and_configuration() {
        let (registry, _store) = registry();
        registry.register(Arc::new(MockFactory::new())).unwrap();

        let config = args(&[("region", json!("eu-west"))]);
        let original = registry.create("mock", config.clone()).await.unwrap();
        original.release().await;

        let restored = registry.reconnect("mock", &original.id()).await.unwrap();
        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.state(), DeviceState::Ready);
        assert_eq!(restored.configuration(), &config);
    }

    #[tokio::test]
    async fn test_reconnect_without_stored_config() {
        let (registry, _store) = registry();
        registry.register(Arc::new(MockFactory::new())).unwrap();

        let err = registry
            .reconnect("mock", &uuid::Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, BayError::Storage(_)));
    }

    // ── Destroy ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_destroy_releases_and_forgets() {
        let (registry, store) = registry();
        registry.register(Arc::new(MockFactory::new())).unwrap();

        let handle = registry.create("mock", Map::new()).await.unwrap();
        registry.destroy(&handle).await.unwrap();

        assert_eq!(handle.state(), DeviceState::Released);
        assert!(store.load(&handle.id()).await.unwrap().is_none());
    }

    // ── Concurrency ────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates() {
        let (registry, store) = registry();
        registry.register(Arc::new(MockFactory::new())).unwrap();
        let registry = Arc::new(registry);

        let mut tasks = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry
                    .create("mock", args(&[("slot", json!(i))]))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for task in tasks {
            let handle = task.await.unwrap();
            assert_eq!(handle.state(), DeviceState::Ready);
            ids.insert(handle.id());
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(store.list(Some("mock")).await.unwrap().len(), 16);
    }
}

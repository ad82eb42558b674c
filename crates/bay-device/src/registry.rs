use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::{info, warn};

use bay_core::{BayError, CapabilityDescriptor, DeviceId, Result};
use bay_store::ConfigStore;

use crate::device::DeviceFactory;
use crate::handle::DeviceHandle;

/// Maps device-type identifiers to the factories that provision them.
///
/// Explicitly constructed and passed by reference; populated at startup
/// and read-only afterwards except for explicit `register` calls. The
/// factory table supports concurrent `create` lookups without blocking
/// other readers. Configuration persistence goes through the pluggable
/// [`ConfigStore`], which the registry treats as an opaque record store.
pub struct DeviceRegistry {
    factories: DashMap<String, Arc<dyn DeviceFactory>>,
    store: Arc<dyn ConfigStore>,
}

impl DeviceRegistry {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            factories: DashMap::new(),
            store,
        }
    }

    /// Register a construction recipe for a device type. Registering a
    /// type that already exists fails and leaves the first registration
    /// intact.
    pub fn register(&self, factory: Arc<dyn DeviceFactory>) -> Result<()> {
        let device_type = factory.descriptor().device_type().to_string();
        match self.factories.entry(device_type.clone()) {
            Entry::Occupied(_) => Err(BayError::DuplicateDeviceType(device_type)),
            Entry::Vacant(slot) => {
                slot.insert(factory);
                info!(device_type, "registered device type");
                Ok(())
            }
        }
    }

    /// Identifiers of every registered device type, sorted.
    pub fn device_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    /// The capability descriptor a device type declares, without
    /// provisioning an instance.
    pub fn descriptor(&self, device_type: &str) -> Result<CapabilityDescriptor> {
        self.factories
            .get(device_type)
            .map(|f| f.descriptor().clone())
            .ok_or_else(|| BayError::UnknownDeviceType(device_type.to_string()))
    }

    /// Provision a new instance of a device type.
    ///
    /// The instance configuration is persisted through the store once
    /// provisioning succeeds; a storage failure is logged but does not
    /// fail the call, since the device is already live.
    pub async fn create(
        &self,
        device_type: &str,
        config: Map<String, Value>,
    ) -> Result<Arc<DeviceHandle>> {
        let factory = self.factory(device_type)?;
        let handle = DeviceHandle::new(device_type, factory.descriptor().clone(), config);
        info!(device_type, id = %handle.id(), "provisioning device");
        handle.provision(factory.as_ref()).await?;

        if let Err(e) = self
            .store
            .save(&handle.id(), device_type, handle.configuration())
            .await
        {
            warn!(error = %e, id = %handle.id(), "failed to persist device configuration");
        }
        Ok(handle)
    }

    /// Re-provision an instance from its stored configuration, keeping
    /// its id.
    pub async fn reconnect(
        &self,
        device_type: &str,
        device_id: &DeviceId,
    ) -> Result<Arc<DeviceHandle>> {
        let factory = self.factory(device_type)?;
        let config = self.store.load(device_id).await?.ok_or_else(|| {
            BayError::Storage(format!("no stored configuration for device {device_id}"))
        })?;
        let handle =
            DeviceHandle::with_id(*device_id, device_type, factory.descriptor().clone(), config);
        info!(device_type, id = %device_id, "reconnecting device");
        handle.provision(factory.as_ref()).await?;
        Ok(handle)
    }

    /// Release an instance and delete its stored configuration.
    pub async fn destroy(&self, handle: &DeviceHandle) -> Result<()> {
        handle.release().await;
        self.store.delete(&handle.id()).await?;
        Ok(())
    }

    fn factory(&self, device_type: &str) -> Result<Arc<dyn DeviceFactory>> {
        self.factories
            .get(device_type)
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(|| BayError::UnknownDeviceType(device_type.to_string()))
    }
}

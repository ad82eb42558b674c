use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use bay_core::{BayError, CapabilityDescriptor, Result};
use bay_device::{Device, DeviceFactory};

use crate::device::FsDevice;
use crate::DEVICE_TYPE;

/// Factory for filesystem devices.
///
/// Provisioning config: `{root: string, create_missing?: bool}`. The
/// root must exist unless `create_missing` is set.
pub struct FsFactory {
    descriptor: CapabilityDescriptor,
}

impl FsFactory {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: crate::capabilities()?,
        })
    }
}

#[async_trait]
impl DeviceFactory for FsFactory {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn provision(&self, config: &Map<String, Value>) -> Result<Arc<dyn Device>> {
        let root = config
            .get("root")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BayError::Provision {
                device_type: DEVICE_TYPE.into(),
                reason: "config requires a 'root' path".into(),
            })?;
        let create_missing = config
            .get("create_missing")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let root = PathBuf::from(root);
        if !root.is_dir() {
            if create_missing {
                tokio::fs::create_dir_all(&root)
                    .await
                    .map_err(|e| BayError::Provision {
                        device_type: DEVICE_TYPE.into(),
                        reason: format!("cannot create root {}: {e}", root.display()),
                    })?;
            } else {
                return Err(BayError::Provision {
                    device_type: DEVICE_TYPE.into(),
                    reason: format!("root does not exist: {}", root.display()),
                });
            }
        }

        info!(root = %root.display(), "provisioned filesystem device");
        Ok(Arc::new(FsDevice::new(root, self.descriptor.clone())))
    }
}

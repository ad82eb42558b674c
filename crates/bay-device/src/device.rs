use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use bay_core::{CapabilityDescriptor, Result};

/// Error reported by a device's backing resource.
///
/// The `unrecoverable` flag is the backend's own classification of the
/// failure: an unrecoverable one moves the instance to `Failed`, a
/// transient one returns it to `Ready`.
#[derive(Debug, Clone)]
pub struct BackendError {
    pub message: String,
    pub unrecoverable: bool,
}

impl BackendError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            unrecoverable: false,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            unrecoverable: true,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendError {}

/// The seam every concrete resource binding implements.
///
/// The dispatch layer never looks past this trait: arguments arrive
/// already validated against the action's declared schema, and the raw
/// payload returned here is wrapped into the invocation result by the
/// dispatcher.
#[async_trait]
pub trait Device: Send + Sync + fmt::Debug {
    /// The declared capability surface of this device kind.
    fn descriptor(&self) -> &CapabilityDescriptor;

    /// Execute one declared action against the backing resource.
    async fn execute(
        &self,
        action: &str,
        args: &Map<String, Value>,
    ) -> std::result::Result<Value, BackendError>;

    /// Read one declared observation. Must be side-effect free: callable
    /// concurrently with other observations and with an in-flight action.
    async fn observe(&self, name: &str) -> std::result::Result<Value, BackendError>;

    /// Tear down the backing resource. Called at most once, on release.
    async fn teardown(&self) {}
}

/// Construction recipe for a device type, held by the registry.
#[async_trait]
pub trait DeviceFactory: Send + Sync {
    /// Capability descriptor of the type this factory provisions.
    fn descriptor(&self) -> &CapabilityDescriptor;

    /// Build and connect the backing resource from a configuration bag.
    async fn provision(&self, config: &Map<String, Value>) -> Result<Arc<dyn Device>>;
}

use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use bay_core::{
    BayError, CapabilityDescriptor, DeviceId, ErrorKind, InvocationRequest, InvocationResult,
    Result,
};

use crate::device::{Device, DeviceFactory};
use crate::state::DeviceState;

/// A provisioned device instance: an opaque id, the lifecycle state
/// machine, the configuration bag this instance exclusively owns, and
/// the backing [`Device`] once provisioning has succeeded.
///
/// State transitions happen only through the dispatcher and the
/// lifecycle calls on this type.
pub struct DeviceHandle {
    id: DeviceId,
    device_type: String,
    descriptor: CapabilityDescriptor,
    state: Mutex<DeviceState>,
    configuration: Map<String, Value>,
    device: OnceLock<Arc<dyn Device>>,
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("id", &self.id)
            .field("device_type", &self.device_type)
            .field("descriptor", &self.descriptor)
            .field("state", &self.state)
            .field("configuration", &self.configuration)
            .field("provisioned", &self.device.get().is_some())
            .finish()
    }
}

impl DeviceHandle {
    /// Create a handle in the `Provisioning` state with a fresh id.
    pub fn new(
        device_type: impl Into<String>,
        descriptor: CapabilityDescriptor,
        configuration: Map<String, Value>,
    ) -> Arc<Self> {
        Self::with_id(Uuid::new_v4(), device_type, descriptor, configuration)
    }

    /// Create a handle in the `Provisioning` state under a known id
    /// (used when reconnecting to a stored configuration).
    pub fn with_id(
        id: DeviceId,
        device_type: impl Into<String>,
        descriptor: CapabilityDescriptor,
        configuration: Map<String, Value>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            device_type: device_type.into(),
            descriptor,
            state: Mutex::new(DeviceState::Provisioning),
            configuration,
            device: OnceLock::new(),
        })
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DeviceState {
        *self.state.lock()
    }

    /// The configuration bag owned by this instance.
    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    pub(crate) fn device(&self) -> Option<&Arc<dyn Device>> {
        self.device.get()
    }

    /// Construct the backing resource through the factory.
    ///
    /// Transitions Provisioning → Ready on success and Provisioning →
    /// Failed on error, in which case the factory's provisioning error
    /// is returned with its underlying cause intact.
    pub async fn provision(&self, factory: &dyn DeviceFactory) -> Result<()> {
        match factory.provision(&self.configuration).await {
            Ok(device) => {
                let _ = self.device.set(device);
                let mut state = self.state.lock();
                if *state == DeviceState::Provisioning {
                    *state = DeviceState::Ready;
                }
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.lock();
                if *state != DeviceState::Released {
                    *state = DeviceState::Failed;
                }
                Err(e)
            }
        }
    }

    /// Invoke one action on this instance.
    ///
    /// Delegates to the dispatcher: the action is resolved and its
    /// arguments validated before any state is touched, the Ready → Busy
    /// transition acts as a non-blocking exclusive claim, and exactly one
    /// result comes back per call. A caller that abandons an in-flight
    /// invocation must treat the outcome as unknown and re-query state
    /// or observations before retrying a non-idempotent action; the
    /// backend operation is not cancelled.
    pub async fn invoke(&self, action: &str, arguments: Map<String, Value>) -> InvocationResult {
        let request = InvocationRequest::new(self.id, action).with_arguments(arguments);
        crate::dispatch::dispatch(self, &request).await
    }

    /// Read one declared observation.
    ///
    /// Side-effect free and callable in any state except Released;
    /// never mutates `state` or `configuration`.
    pub async fn observe(&self, name: &str) -> Result<Value> {
        if self.state() == DeviceState::Released {
            return Err(BayError::DeviceReleased(self.id));
        }
        if self.descriptor.observation(name).is_none() {
            return Err(BayError::UnknownObservation {
                device_type: self.device_type.clone(),
                name: name.to_string(),
            });
        }
        let Some(device) = self.device.get() else {
            return Err(BayError::NotProvisioned(self.id));
        };
        device
            .observe(name)
            .await
            .map_err(|e| BayError::Observation {
                name: name.to_string(),
                reason: e.message,
            })
    }

    /// Release this instance. Idempotent; any state transitions to
    /// Released and the backing resource is torn down once. Subsequent
    /// invoke and observe calls report the device as released.
    pub async fn release(&self) {
        {
            let mut state = self.state.lock();
            if *state == DeviceState::Released {
                return;
            }
            *state = DeviceState::Released;
        }
        info!(id = %self.id, device_type = %self.device_type, "device released");
        if let Some(device) = self.device.get() {
            device.teardown().await;
        }
    }

    /// Claim the instance for one invocation: Ready → Busy, or a
    /// structured unavailability result naming the actual state.
    pub(crate) fn begin_invocation(&self) -> std::result::Result<(), InvocationResult> {
        let mut state = self.state.lock();
        match *state {
            DeviceState::Ready => {
                *state = DeviceState::Busy;
                Ok(())
            }
            DeviceState::Busy => Err(InvocationResult::unavailable(
                ErrorKind::DeviceBusy,
                "an invocation is already in flight",
            )),
            DeviceState::Provisioning => Err(InvocationResult::unavailable(
                ErrorKind::DeviceNotReady,
                "device is still provisioning",
            )),
            DeviceState::Failed => Err(InvocationResult::unavailable(
                ErrorKind::DeviceNotReady,
                "device is in the failed state",
            )),
            DeviceState::Released => Err(InvocationResult::unavailable(
                ErrorKind::DeviceReleased,
                "device has been released",
            )),
        }
    }

    /// Drop the Busy claim after the single execution attempt. The
    /// backend's failure classification decides Ready vs Failed; a
    /// release that landed mid-flight wins and is never overwritten.
    pub(crate) fn finish_invocation(&self, unrecoverable_failure: bool) {
        let mut state = self.state.lock();
        if *state != DeviceState::Busy {
            return;
        }
        if unrecoverable_failure {
            warn!(id = %self.id, device_type = %self.device_type, "device moved to failed state");
            *state = DeviceState::Failed;
        } else {
            *state = DeviceState::Ready;
        }
    }
}

//! Mock device for deterministic testing.
//!
//! Executes no real resource operations: outcomes are queued up front,
//! calls are counted, and an optional artificial delay makes concurrency
//! windows wide enough to test the Busy claim.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use bay_core::{
    ActionSchema, BayError, CapabilityDescriptor, ObservationSpec, ParamKind, ParamSpec, Result,
    ReturnSpec,
};

use crate::device::{BackendError, Device, DeviceFactory};

/// A queued outcome for the next `execute` call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Ok(Value),
    Transient(String),
    Fatal(String),
}

/// A mock device with queued outcomes and call accounting.
///
/// With nothing queued, `execute` echoes the action name and arguments
/// back as the payload.
#[derive(Debug)]
pub struct MockDevice {
    descriptor: CapabilityDescriptor,
    outcomes: Mutex<VecDeque<MockOutcome>>,
    delay: Option<Duration>,
    executions: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            descriptor: mock_descriptor(),
            outcomes: Mutex::new(VecDeque::new()),
            delay: None,
            executions: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Make every execution sleep before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful payload.
    pub fn with_result(self, payload: Value) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Ok(payload));
        self
    }

    /// Queue a transient backend failure.
    pub fn with_transient_error(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Transient(message.to_string()));
        self
    }

    /// Queue an unrecoverable backend failure.
    pub fn with_fatal_error(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Fatal(message.to_string()));
        self
    }

    /// Total number of `execute` calls that reached this device.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Highest number of `execute` calls ever in flight at once.
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Device for MockDevice {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        action: &str,
        args: &Map<String, Value>,
    ) -> std::result::Result<Value, BackendError> {
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        self.executions.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.outcomes.lock().unwrap().pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            None => Ok(json!({ "action": action, "arguments": args })),
            Some(MockOutcome::Ok(payload)) => Ok(payload),
            Some(MockOutcome::Transient(message)) => Err(BackendError::transient(message)),
            Some(MockOutcome::Fatal(message)) => Err(BackendError::fatal(message)),
        }
    }

    async fn observe(&self, name: &str) -> std::result::Result<Value, BackendError> {
        match name {
            "calls" => Ok(json!(self.executions())),
            "ping" => Ok(json!("pong")),
            other => Err(BackendError::transient(format!(
                "no such observation: {other}"
            ))),
        }
    }
}

/// Factory for [`MockDevice`] instances.
///
/// By default every `provision` yields a fresh device; hand in a shared
/// one with [`MockFactory::with_device`] to keep its counters visible to
/// the test, or make provisioning itself fail with
/// [`MockFactory::failing`].
pub struct MockFactory {
    descriptor: CapabilityDescriptor,
    device: Mutex<Option<Arc<MockDevice>>>,
    fail: Option<String>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self {
            descriptor: mock_descriptor(),
            device: Mutex::new(None),
            fail: None,
        }
    }

    pub fn with_device(device: Arc<MockDevice>) -> Self {
        Self {
            descriptor: mock_descriptor(),
            device: Mutex::new(Some(device)),
            fail: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            descriptor: mock_descriptor(),
            device: Mutex::new(None),
            fail: Some(reason.to_string()),
        }
    }
}

impl Default for MockFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceFactory for MockFactory {
    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn provision(&self, _config: &Map<String, Value>) -> Result<Arc<dyn Device>> {
        if let Some(reason) = &self.fail {
            return Err(BayError::Provision {
                device_type: self.descriptor.device_type().to_string(),
                reason: reason.clone(),
            });
        }
        let device = self.device.lock().unwrap().clone();
        Ok(device.unwrap_or_else(|| Arc::new(MockDevice::new())))
    }
}

fn mock_descriptor() -> CapabilityDescriptor {
    let mut descriptor = CapabilityDescriptor::new("mock", "A mock device for tests");
    descriptor
        .add_action(
            ActionSchema::new("echo", "Echo the message back")
                .param(ParamSpec::required(
                    "message",
                    ParamKind::String,
                    "The message to echo",
                ))
                .returns(ReturnSpec::new(ParamKind::Object, "The echoed call")),
        )
        .expect("mock descriptor");
    descriptor
        .add_action(
            ActionSchema::new("poke", "Do nothing")
                .returns(ReturnSpec::new(ParamKind::Object, "The echoed call")),
        )
        .expect("mock descriptor");
    descriptor
        .add_observation(ObservationSpec::new(
            "calls",
            "How many executions have reached the backend",
            ReturnSpec::new(ParamKind::Integer, "Execution count"),
        ))
        .expect("mock descriptor");
    descriptor
        .add_observation(ObservationSpec::new(
            "ping",
            "Liveness probe",
            ReturnSpec::new(ParamKind::String, "Always 'pong'"),
        ))
        .expect("mock descriptor");
    descriptor
}

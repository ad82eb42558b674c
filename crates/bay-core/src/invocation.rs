use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::schema::Violation;

/// Unique identifier of a provisioned device instance.
pub type DeviceId = Uuid;

/// A request to invoke one action on one device instance. Transient;
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub device_id: DeviceId,
    pub action: String,
    pub arguments: Map<String, Value>,
}

impl InvocationRequest {
    pub fn new(device_id: DeviceId, action: impl Into<String>) -> Self {
        Self {
            device_id,
            action: action.into(),
            arguments: Map::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_arguments(mut self, arguments: Map<String, Value>) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Terminal status of a dispatched invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    Ok,
    ValidationError,
    ExecutionError,
    DeviceUnavailable,
}

/// Machine-readable classification of a failed invocation. Planners use
/// this to decide between fixing the request, retrying after backoff,
/// recreating the instance, and aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The action is not in the device type's capability descriptor.
    UnknownAction,
    /// The arguments failed schema validation; see `violations`.
    InvalidArguments,
    /// The request names a different device instance than the one it
    /// was routed to.
    WrongDevice,
    /// Another invocation is in flight; safe to retry after backoff.
    DeviceBusy,
    /// Still provisioning, or failed; not accepting invocations.
    DeviceNotReady,
    /// The instance was released; it must be recreated.
    DeviceReleased,
    /// The backing resource reported a failure.
    Backend,
}

/// Structured error half of an invocation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// The one result every dispatched invocation terminates in. `payload`
/// is present iff the status is `Ok`; `error` is present otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    pub status: InvocationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<InvocationError>,
}

impl InvocationResult {
    pub fn ok(payload: Value) -> Self {
        Self {
            status: InvocationStatus::Ok,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn validation(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::ValidationError,
            payload: None,
            error: Some(InvocationError {
                kind,
                message: message.into(),
                violations: Vec::new(),
            }),
        }
    }

    /// A validation failure carrying the per-field violation list.
    pub fn invalid_arguments(violations: Vec<Violation>) -> Self {
        let message = violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            status: InvocationStatus::ValidationError,
            payload: None,
            error: Some(InvocationError {
                kind: ErrorKind::InvalidArguments,
                message,
                violations,
            }),
        }
    }

    pub fn unavailable(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::DeviceUnavailable,
            payload: None,
            error: Some(InvocationError {
                kind,
                message: message.into(),
                violations: Vec::new(),
            }),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::ExecutionError,
            payload: None,
            error: Some(InvocationError {
                kind: ErrorKind::Backend,
                message: message.into(),
                violations: Vec::new(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == InvocationStatus::Ok
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a provisioned device instance.
///
/// Provisioning → {Ready, Failed}; Ready ↔ Busy (each invocation
/// round-trips); Ready/Busy/Failed → Released. Released is terminal:
/// no transition leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Provisioning,
    Ready,
    Busy,
    Released,
    Failed,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceState::Provisioning => "provisioning",
            DeviceState::Ready => "ready",
            DeviceState::Busy => "busy",
            DeviceState::Released => "released",
            DeviceState::Failed => "failed",
        };
        f.write_str(s)
    }
}

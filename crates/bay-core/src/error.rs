use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the Bay device layer.
///
/// Everything that crosses the dispatch boundary is returned as a
/// structured [`crate::InvocationResult`] instead; these variants cover
/// registration-time, provisioning, and storage failures surfaced to the
/// operator, plus the released-device signal on `observe`.
#[derive(Error, Debug)]
pub enum BayError {
    // ── Capability errors ──────────────────────────────────────
    #[error("duplicate action: {device_type}: {action}")]
    DuplicateAction { device_type: String, action: String },

    // ── Registry errors ────────────────────────────────────────
    #[error("duplicate device type: {0}")]
    DuplicateDeviceType(String),

    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    // ── Lifecycle errors ───────────────────────────────────────
    #[error("provisioning failed: {device_type}: {reason}")]
    Provision { device_type: String, reason: String },

    #[error("device released: {0}")]
    DeviceReleased(Uuid),

    #[error("device not provisioned: {0}")]
    NotProvisioned(Uuid),

    // ── Observation errors ─────────────────────────────────────
    #[error("unknown observation: {device_type}: {name}")]
    UnknownObservation { device_type: String, name: String },

    #[error("observation failed: {name}: {reason}")]
    Observation { name: String, reason: String },

    // ── Storage errors ─────────────────────────────────────────
    #[error("storage error: {0}")]
    Storage(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BayError>;

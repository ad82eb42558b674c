//! # bay-core
//!
//! Core types for the Bay device layer: action schemas, capability
//! descriptors, invocation requests/results, and the unified error type.
//! This crate defines the shared vocabulary used by every other crate in
//! the workspace.

pub mod capability;
pub mod error;
pub mod invocation;
pub mod schema;

pub use capability::{CapabilityDescriptor, ObservationSpec};
pub use error::{BayError, Result};
pub use invocation::{
    DeviceId, ErrorKind, InvocationError, InvocationRequest, InvocationResult, InvocationStatus,
};
pub use schema::{ActionSchema, ParamKind, ParamSpec, ReturnSpec, Violation};

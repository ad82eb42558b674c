//! # bay-device
//!
//! The device contract for the Bay runtime: the [`Device`] trait concrete
//! resource bindings implement, the [`DeviceHandle`] instance wrapper
//! with its lifecycle state machine, the action [`dispatch`] layer, and
//! the [`DeviceRegistry`] mapping device-type identifiers to factories.
//!
//! An agent discovers device types through the registry, reads a type's
//! capability descriptor, provisions an instance, and submits invocation
//! requests. The dispatcher validates each request against the declared
//! schema and routes it to the backing resource; every request terminates
//! in exactly one structured [`bay_core::InvocationResult`].

pub mod device;
pub mod dispatch;
pub mod handle;
pub mod mock;
pub mod registry;
pub mod state;

pub use device::{BackendError, Device, DeviceFactory};
pub use dispatch::dispatch;
pub use handle::DeviceHandle;
pub use mock::{MockDevice, MockFactory};
pub use registry::DeviceRegistry;
pub use state::DeviceState;

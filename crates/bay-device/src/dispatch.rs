//! The action dispatcher.
//!
//! Validates an invocation request against the target instance's declared
//! capabilities, routes it to the backing resource, and normalizes the
//! outcome. Every request terminates in exactly one
//! [`InvocationResult`]; no error crosses this boundary as a fault, and
//! at most one execution attempt is made per request. Retry policy
//! belongs to the caller.

use tracing::{debug, warn};

use bay_core::{ErrorKind, InvocationRequest, InvocationResult};

use crate::handle::DeviceHandle;

/// Dispatch one invocation request against one device instance.
pub async fn dispatch(handle: &DeviceHandle, request: &InvocationRequest) -> InvocationResult {
    debug!(device = %handle.id(), action = %request.action, "dispatching invocation");

    if request.device_id != handle.id() {
        return InvocationResult::validation(
            ErrorKind::WrongDevice,
            format!(
                "request targets device {} but was routed to {}",
                request.device_id,
                handle.id()
            ),
        );
    }

    // Resolve the action against the declared capabilities. Rejected
    // before any device state is consulted, so an unknown action is a
    // validation error in every state.
    let Some(schema) = handle.descriptor().resolve(&request.action) else {
        return InvocationResult::validation(
            ErrorKind::UnknownAction,
            format!(
                "device type '{}' has no action '{}'",
                handle.device_type(),
                request.action
            ),
        );
    };

    let violations = schema.validate(&request.arguments);
    if !violations.is_empty() {
        return InvocationResult::invalid_arguments(violations);
    }

    // Claim the instance: Ready → Busy, non-blocking.
    if let Err(unavailable) = handle.begin_invocation() {
        return unavailable;
    }

    let Some(device) = handle.device() else {
        handle.finish_invocation(false);
        return InvocationResult::unavailable(ErrorKind::DeviceNotReady, "no backing resource");
    };

    // The single execution attempt.
    match device.execute(&request.action, &request.arguments).await {
        Ok(payload) => {
            let returns = schema.return_spec();
            if !returns.kind.admits(&payload) {
                warn!(
                    device = %handle.id(),
                    action = %request.action,
                    declared = %returns.kind,
                    "backend payload does not match the declared return type"
                );
            }
            handle.finish_invocation(false);
            InvocationResult::ok(payload)
        }
        Err(e) => {
            warn!(
                device = %handle.id(),
                action = %request.action,
                error = %e,
                unrecoverable = e.unrecoverable,
                "action execution failed"
            );
            handle.finish_invocation(e.unrecoverable);
            InvocationResult::execution(e.message)
        }
    }
}

//! Built-in session-lifecycle operations every registry carries.
//!
//! All of them are singletons: they match one RPC by name and namespace,
//! report `HANDLE_WITH_DEFAULT_PRIORITY`, and never execute the rest of the
//! chain.

pub mod close_session;
pub mod exi;

pub use close_session::DefaultCloseSession;
pub use exi::{DefaultStartExi, DefaultStopExi};

use netconf_core::{Document, DocumentedError, HandlingPriority};

/// Priority a singleton reports for its own RPC, `CANNOT_HANDLE` otherwise.
fn singleton_priority(request: &Document, name: &str, namespace: &str) -> HandlingPriority {
    if request.is_rpc(name, namespace) {
        HandlingPriority::HANDLE_WITH_DEFAULT_PRIORITY
    } else {
        HandlingPriority::CANNOT_HANDLE
    }
}

/// Error for a session-aware built-in invoked before any session was bound.
fn no_session_bound(operation: &str) -> DocumentedError {
    DocumentedError::operation_failed(format!("No session bound to {operation}"))
}

//! The operation capability: the unit the router selects and chains.

use std::sync::Arc;

use async_trait::async_trait;
use netconf_core::{Document, DocumentedError, HandlingPriority};

use super::chain::ChainedExecution;
use crate::session::NetconfServerSession;

// ---------------------------------------------------------------------------
// NetconfOperation trait
// ---------------------------------------------------------------------------

/// A handler that can rank itself for a request and process it.
///
/// Operations are shared as `Arc<dyn NetconfOperation>` and compared by
/// identity, never by value. Probing follows a two-phase protocol: the router
/// first calls `bind_session` on every operation that `requires_session`,
/// then calls `can_handle` on all of them.
#[async_trait]
pub trait NetconfOperation: Send + Sync {
    /// Human-readable name used in diagnostics and logs.
    fn name(&self) -> &str;

    /// Whether the operation needs the current session bound before probing.
    fn requires_session(&self) -> bool {
        false
    }

    /// Binds the session the next request belongs to. Called once per
    /// request, before `can_handle`, when `requires_session` is `true`.
    fn bind_session(&self, _session: &Arc<NetconfServerSession>) {}

    /// Ranks this operation for `request`; `CANNOT_HANDLE` opts out.
    fn can_handle(&self, request: &Document) -> HandlingPriority;

    /// Processes `request`.
    ///
    /// `subsequent` is the rest of the chain. The operation decides whether,
    /// when and how often to execute it; not executing it ends the chain.
    async fn handle(
        &self,
        request: &Document,
        subsequent: &ChainedExecution,
    ) -> Result<Document, OperationError>;
}

/// Identity comparison for shared operations.
///
/// Compares data pointers only, so the same object seen through different
/// vtables still counts as one operation.
#[must_use]
pub fn same_operation(a: &Arc<dyn NetconfOperation>, b: &Arc<dyn NetconfOperation>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

// ---------------------------------------------------------------------------
// OperationError
// ---------------------------------------------------------------------------

/// Failure returned by an operation's `handle`.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// A protocol-level error the operation classified itself. Passed to the
    /// peer unchanged.
    #[error(transparent)]
    Documented(#[from] DocumentedError),
    /// Anything else. The router reports it as a generic `operation-failed`.
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use netconf_core::ErrorTag;

    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl NetconfOperation for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn can_handle(&self, _request: &Document) -> HandlingPriority {
            HandlingPriority::CANNOT_HANDLE
        }

        async fn handle(
            &self,
            request: &Document,
            _subsequent: &ChainedExecution,
        ) -> Result<Document, OperationError> {
            Ok(Document::ok_reply(request))
        }
    }

    #[test]
    fn identity_not_value() {
        let a: Arc<dyn NetconfOperation> = Arc::new(Named("same"));
        let b: Arc<dyn NetconfOperation> = Arc::new(Named("same"));
        assert!(same_operation(&a, &Arc::clone(&a)));
        assert!(!same_operation(&a, &b));
    }

    #[test]
    fn default_capabilities() {
        let op = Named("plain");
        assert!(!op.requires_session());
    }

    #[test]
    fn error_conversions() {
        let documented: OperationError =
            DocumentedError::application("bad", ErrorTag::InvalidValue).into();
        assert!(matches!(
            documented,
            OperationError::Documented(ref e) if e.error_tag == ErrorTag::InvalidValue
        ));

        let internal: OperationError = anyhow::anyhow!("disk gone").into();
        assert_eq!(internal.to_string(), "internal error: disk gone");
    }
}

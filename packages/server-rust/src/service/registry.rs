//! Per-session operation registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use netconf_core::SessionId;
use tracing::debug;

use super::backend::OperationService;
use super::builtin::{DefaultCloseSession, DefaultStartExi, DefaultStopExi};
use super::operation::{same_operation, NetconfOperation};

// ---------------------------------------------------------------------------
// SessionResources
// ---------------------------------------------------------------------------

/// The session's operation-service backend together with its release state.
///
/// Shared between the registry and `<close-session>`, whichever releases it
/// first. After one successful release, `close` no longer reaches the backend.
pub struct SessionResources {
    backend: Arc<dyn OperationService>,
    closed: AtomicBool,
}

impl SessionResources {
    #[must_use]
    pub fn new(backend: Arc<dyn OperationService>) -> Self {
        Self {
            backend,
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn OperationService> {
        &self.backend
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Releases the backend. Once a release succeeds, later calls return
    /// `Ok(())` without touching it.
    ///
    /// # Errors
    ///
    /// Returns the backend's close failure. The resources stay unreleased, so
    /// the next call tries again.
    pub async fn close(&self) -> anyhow::Result<()> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }
        let released = self.backend.close().await;
        if released.is_err() {
            self.closed.store(false, Ordering::Release);
        }
        released
    }
}

// ---------------------------------------------------------------------------
// OperationRegistry
// ---------------------------------------------------------------------------

/// The fixed set of operations available to one session.
///
/// Built once per session from the built-in lifecycle operations plus every
/// operation the backend contributes, deduplicated by identity. Membership
/// never changes afterwards.
pub struct OperationRegistry {
    session_id: SessionId,
    operations: Vec<Arc<dyn NetconfOperation>>,
    resources: Arc<SessionResources>,
}

impl OperationRegistry {
    #[must_use]
    pub fn new(session_id: SessionId, backend: Arc<dyn OperationService>) -> Self {
        let resources = Arc::new(SessionResources::new(backend));

        let builtins: [Arc<dyn NetconfOperation>; 3] = [
            Arc::new(DefaultCloseSession::new(session_id, Arc::clone(&resources))),
            Arc::new(DefaultStartExi::new(session_id)),
            Arc::new(DefaultStopExi::new(session_id)),
        ];

        let mut operations: Vec<Arc<dyn NetconfOperation>> = Vec::new();
        for op in builtins.into_iter().chain(resources.backend().operations()) {
            if operations.iter().any(|known| same_operation(known, &op)) {
                continue;
            }
            operations.push(op);
        }

        debug!(
            session_id = %session_id,
            operations = operations.len(),
            "operation registry built"
        );

        Self {
            session_id,
            operations,
            resources,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn operations(&self) -> &[Arc<dyn NetconfOperation>] {
        &self.operations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.resources.is_closed()
    }

    /// Releases the backend operation service.
    ///
    /// # Errors
    ///
    /// Propagates the backend's close failure.
    pub async fn close(&self) -> anyhow::Result<()> {
        self.resources.close().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Pluggable operation-service backends contributing operations to a session.

use std::sync::Arc;

use async_trait::async_trait;

use super::operation::NetconfOperation;

/// A source of operations for one session.
///
/// The backend is shared read-only by every request of the session and
/// released exactly once, through `close`, after the session is retired.
#[async_trait]
pub trait OperationService: Send + Sync {
    /// Operations this backend contributes. Called once, when the session's
    /// registry is built.
    fn operations(&self) -> Vec<Arc<dyn NetconfOperation>>;

    /// Release resources held for the session.
    async fn close(&self) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// AggregatedOperationService
// ---------------------------------------------------------------------------

/// Presents several backends as one.
///
/// Operations are the concatenation of every member's operations, in member
/// order. `close` closes every member even if some fail.
#[derive(Default)]
pub struct AggregatedOperationService {
    members: Vec<Arc<dyn OperationService>>,
}

impl AggregatedOperationService {
    #[must_use]
    pub fn new(members: Vec<Arc<dyn OperationService>>) -> Self {
        Self { members }
    }

    pub fn push(&mut self, member: Arc<dyn OperationService>) {
        self.members.push(member);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[async_trait]
impl OperationService for AggregatedOperationService {
    fn operations(&self) -> Vec<Arc<dyn NetconfOperation>> {
        self.members.iter().flat_map(|m| m.operations()).collect()
    }

    /// Closes every member, then reports the first failure.
    async fn close(&self) -> anyhow::Result<()> {
        let mut first_error = None;
        let mut failures = 0usize;
        for member in &self.members {
            if let Err(e) = member.close().await {
                tracing::warn!(error = %e, "failed to close operation service");
                failures += 1;
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            None => Ok(()),
            Some(e) if failures == 1 => Err(e),
            Some(e) => Err(e.context(format!("{failures} operation services failed to close"))),
        }
    }
}

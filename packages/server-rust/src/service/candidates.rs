//! Per-request candidate set and execution chain construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use netconf_core::HandlingPriority;

use super::chain::ChainedExecution;
use super::operation::NetconfOperation;

/// Two operations claimed the same priority for one request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("multiple operations available with priority {priority}: {conflicting} and {existing}")]
pub struct AmbiguousPriority {
    pub priority: HandlingPriority,
    /// The operation already holding the priority.
    pub existing: String,
    /// The operation that tried to claim it.
    pub conflicting: String,
}

/// Operations willing to handle one request, keyed by the priority each reported.
///
/// Each priority maps to exactly one operation. `CANNOT_HANDLE` is never stored.
#[derive(Default)]
pub struct CandidateSet {
    by_priority: BTreeMap<HandlingPriority, Arc<dyn NetconfOperation>>,
}

impl CandidateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `operation` under `priority`.
    ///
    /// `CANNOT_HANDLE` is ignored and returns `Ok(false)`; a stored candidate
    /// returns `Ok(true)`.
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousPriority` if another operation already holds `priority`.
    /// The set is left unchanged.
    pub fn insert(
        &mut self,
        priority: HandlingPriority,
        operation: Arc<dyn NetconfOperation>,
    ) -> Result<bool, AmbiguousPriority> {
        if !priority.can_handle() {
            return Ok(false);
        }
        if let Some(existing) = self.by_priority.get(&priority) {
            return Err(AmbiguousPriority {
                priority,
                existing: existing.name().to_string(),
                conflicting: operation.name().to_string(),
            });
        }
        self.by_priority.insert(priority, operation);
        Ok(true)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_priority.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_priority.len()
    }

    /// Highest priority present.
    #[must_use]
    pub fn highest(&self) -> Option<HandlingPriority> {
        self.by_priority.keys().next_back().copied()
    }

    /// Builds the execution chain, highest priority at the head.
    ///
    /// Walks the priorities in ascending order, wrapping the chain built so
    /// far, so the lowest candidate ends up in front of the terminus. An empty
    /// set yields the bare terminus.
    #[must_use]
    pub fn into_chain(self) -> ChainedExecution {
        self.by_priority
            .into_values()
            .fold(ChainedExecution::Terminus, |subsequent, operation| {
                ChainedExecution::link(operation, subsequent)
            })
    }
}

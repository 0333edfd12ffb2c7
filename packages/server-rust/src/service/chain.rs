//! Execution chain: the continuation handed to each operation.

use std::fmt;
use std::sync::Arc;

use netconf_core::Document;

use super::operation::{NetconfOperation, OperationError};

/// The rest of an execution chain, as seen by the operation currently running.
///
/// A `Link` delegates to the next-lower-priority operation; the `Terminus`
/// marks the end of the chain. Executing the terminus is not an error: it
/// yields `Ok(None)`, meaning nothing further handled the request.
pub enum ChainedExecution {
    Link {
        operation: Arc<dyn NetconfOperation>,
        subsequent: Box<ChainedExecution>,
    },
    Terminus,
}

impl ChainedExecution {
    /// Wraps `operation` in front of `subsequent`.
    #[must_use]
    pub fn link(operation: Arc<dyn NetconfOperation>, subsequent: ChainedExecution) -> Self {
        Self::Link {
            operation,
            subsequent: Box::new(subsequent),
        }
    }

    #[must_use]
    pub fn is_execution_termination(&self) -> bool {
        matches!(self, Self::Terminus)
    }

    /// The operation this node delegates to, `None` for the terminus.
    #[must_use]
    pub fn operation(&self) -> Option<&Arc<dyn NetconfOperation>> {
        match self {
            Self::Link { operation, .. } => Some(operation),
            Self::Terminus => None,
        }
    }

    /// Operations remaining in the chain, highest priority first.
    pub fn operations(&self) -> impl Iterator<Item = &Arc<dyn NetconfOperation>> + '_ {
        let mut cursor = self;
        std::iter::from_fn(move || {
            let current = cursor;
            match current {
                Self::Link {
                    operation,
                    subsequent,
                } => {
                    cursor = &**subsequent;
                    Some(operation)
                }
                Self::Terminus => None,
            }
        })
    }

    /// Hands `request` to the next operation along with the remainder of the chain.
    ///
    /// # Errors
    ///
    /// Returns whatever the delegated operation's `handle` returns.
    pub async fn execute(&self, request: &Document) -> Result<Option<Document>, OperationError> {
        match self {
            Self::Link {
                operation,
                subsequent,
            } => operation.handle(request, subsequent).await.map(Some),
            Self::Terminus => Ok(None),
        }
    }
}

impl fmt::Debug for ChainedExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.operations().map(|op| op.name()))
            .finish()
    }
}

// Unlinks iteratively so long chains never recurse on drop.
impl Drop for ChainedExecution {
    fn drop(&mut self) {
        if let Self::Link { subsequent, .. } = self {
            let mut next = std::mem::replace(&mut **subsequent, Self::Terminus);
            while let Self::Link { subsequent, .. } = &mut next {
                next = std::mem::replace(&mut **subsequent, Self::Terminus);
            }
        }
    }
}

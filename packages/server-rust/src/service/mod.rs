//! Operation routing and execution framework.
//!
//! This module implements the per-session operation pipeline:
//!
//! 1. **Operations** (`operation`): the `NetconfOperation` capability trait
//! 2. **Registry** (`registry`, `backend`, `builtin`): the fixed operation set of one session
//! 3. **Candidates** (`candidates`): per-request priority ranking and chain construction
//! 4. **Chain** (`chain`): the continuation each operation may delegate to
//! 5. **Routing** (`router`): selection, execution and protocol error mapping
//! 6. **Middleware** (`middleware`): Tower layers around the router

pub mod backend;
pub mod builtin;
pub mod candidates;
pub mod chain;
pub mod config;
pub mod middleware;
pub mod operation;
pub mod registry;
pub mod router;

// Re-export key types for convenient access.
pub use backend::{AggregatedOperationService, OperationService};
pub use candidates::{AmbiguousPriority, CandidateSet};
pub use chain::ChainedExecution;
pub use config::RouterConfig;
pub use operation::{same_operation, NetconfOperation, OperationError};
pub use registry::{OperationRegistry, SessionResources};
pub use router::{OperationRouter, RouterService, RoutingError, RpcRequest};

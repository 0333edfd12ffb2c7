//! NETCONF server: session-scoped operation registry and priority-chained operation router.

pub mod service;
pub mod session;
pub mod telemetry;

pub use service::{
    ChainedExecution, NetconfOperation, OperationError, OperationRegistry, OperationRouter,
    OperationService, RouterConfig,
};
pub use session::{NetconfServerSession, SessionBinding};

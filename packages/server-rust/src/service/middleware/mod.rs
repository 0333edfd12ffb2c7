//! Tower middleware layers for the RPC pipeline.
//!
//! - [`metrics`]: RPC timing and outcome via `tracing` spans
//! - [`pipeline`]: Composes the layers around the router service

pub mod metrics;
pub mod pipeline;

pub use metrics::MetricsLayer;
pub use pipeline::build_rpc_pipeline;

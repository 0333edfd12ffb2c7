//! Pipeline composition: wraps the router service in the middleware stack.

use std::sync::Arc;

use netconf_core::{Document, DocumentedError};
use tower::ServiceBuilder;

use super::metrics::MetricsLayer;
use crate::service::router::{OperationRouter, RouterService, RpcRequest};

/// Build the RPC pipeline around a shared `OperationRouter`.
///
/// Only `MetricsLayer` wraps the router. Timeouts and request serialization
/// per session are left to the session layer.
#[must_use]
pub fn build_rpc_pipeline(
    router: Arc<OperationRouter>,
) -> impl tower::Service<RpcRequest, Response = Document, Error = DocumentedError> + Clone {
    ServiceBuilder::new()
        .layer(MetricsLayer)
        .service(RouterService::new(router))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Metrics middleware for routed RPCs.
//!
//! Records RPC duration and outcome using `tracing` spans, not a metrics crate.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use netconf_core::{Document, DocumentedError};
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::router::RpcRequest;

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments RPCs with timing and outcome via `tracing` spans.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records RPC duration, outcome and error tag.
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<RpcRequest> for MetricsService<S>
where
    S: Service<RpcRequest, Response = Document, Error = DocumentedError> + Send,
    S::Future: Send + 'static,
{
    type Response = Document;
    type Error = DocumentedError;
    type Future = Pin<Box<dyn Future<Output = Result<Document, DocumentedError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RpcRequest) -> Self::Future {
        let rpc = req
            .document
            .operation_name()
            .unwrap_or("<not-an-rpc>")
            .to_string();
        let session_id = req.session.id().0;

        let span = info_span!(
            "rpc",
            rpc = %rpc,
            session_id = session_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;
                let (outcome, error_tag) = match &result {
                    Ok(_) => ("ok", None),
                    Err(e) => ("error", Some(e.error_tag.as_str())),
                };

                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                tracing::info!(
                    rpc = %rpc,
                    session_id = session_id,
                    duration_ms = duration_ms,
                    outcome = outcome,
                    error_tag = error_tag,
                    "rpc complete"
                );

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

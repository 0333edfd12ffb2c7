//! Operation routing: selects operations by priority and runs them as a chain.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::FutureExt;
use netconf_core::{Document, DocumentedError, ErrorTag};
use tower::Service;
use tracing::{debug, error, warn};

use super::backend::OperationService;
use super::candidates::{AmbiguousPriority, CandidateSet};
use super::chain::ChainedExecution;
use super::config::RouterConfig;
use super::operation::OperationError;
use super::registry::OperationRegistry;
use crate::session::NetconfServerSession;

const UNEXPECTED_ERROR: &str = "Unexpected error";

// ---------------------------------------------------------------------------
// RoutingError
// ---------------------------------------------------------------------------

/// Why a request could not be routed or executed.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("No operation available to handle message {message}")]
    NoHandler { message: String },
    #[error("Multiple operations available to handle message {message} with priority {}, {} and {}", .conflict.priority, .conflict.conflicting, .conflict.existing)]
    Ambiguous {
        message: String,
        #[source]
        conflict: AmbiguousPriority,
    },
    #[error("{stage}: {detail}")]
    Unexpected { stage: &'static str, detail: String },
}

impl RoutingError {
    /// Protocol error tag reported to the peer.
    #[must_use]
    pub fn error_tag(&self) -> ErrorTag {
        match self {
            Self::NoHandler { .. } => ErrorTag::OperationNotSupported,
            Self::Ambiguous { .. } | Self::Unexpected { .. } => ErrorTag::OperationFailed,
        }
    }

    /// Converts into the documented error sent to the peer.
    ///
    /// Selection failures name the request and session in the message and
    /// carry the reason under the tag's key. Unexpected failures get a fixed
    /// message; their detail only appears under the `error` key.
    #[must_use]
    pub fn into_documented(self, message: &str, session: &NetconfServerSession) -> DocumentedError {
        let tag = self.error_tag();
        match self {
            Self::Unexpected { detail, .. } => {
                DocumentedError::operation_failed(UNEXPECTED_ERROR).with_info("error", detail)
            }
            selection => DocumentedError::application(
                format!("Unable to handle rpc {message} on {session}"),
                tag,
            )
            .with_info(tag.as_str(), selection.to_string()),
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

// ---------------------------------------------------------------------------
// OperationRouter
// ---------------------------------------------------------------------------

/// Routes requests of one session to the operations in its registry.
///
/// Priorities are re-evaluated for every request: each operation ranks
/// itself, the candidates form a chain in descending priority, and the head
/// of the chain runs with the rest of the chain as its continuation. The
/// router keeps no per-request state, so concurrent `route` calls are safe as
/// far as the router is concerned.
pub struct OperationRouter {
    registry: OperationRegistry,
    config: RouterConfig,
}

impl OperationRouter {
    #[must_use]
    pub fn new(registry: OperationRegistry, config: RouterConfig) -> Self {
        Self { registry, config }
    }

    /// Builds the session's registry from `backend` and wraps it in a router.
    #[must_use]
    pub fn for_session(
        session: &NetconfServerSession,
        backend: Arc<dyn OperationService>,
        config: RouterConfig,
    ) -> Self {
        Self::new(OperationRegistry::new(session.id(), backend), config)
    }

    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Routes `request` and returns the reply produced by the chain.
    ///
    /// # Errors
    ///
    /// - `operation-not-supported` when no operation can handle the request.
    /// - `operation-failed` when two operations claim the same priority, or an
    ///   operation fails unexpectedly while ranking or handling.
    /// - Any documented error an operation returns, unchanged.
    pub async fn route(
        &self,
        request: &Document,
        session: &Arc<NetconfServerSession>,
    ) -> Result<Document, DocumentedError> {
        let chain = match self.build_chain(request, session) {
            Ok(chain) => chain,
            Err(e) => return Err(self.report(e, request, session)),
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                session_id = %session.id(),
                operation = chain.operation().map_or("<none>", |op| op.name()),
                message = %self.render(request),
                "forwarding rpc"
            );
        }

        let outcome = AssertUnwindSafe(chain.execute(request)).catch_unwind().await;
        let failure = match outcome {
            Ok(Ok(Some(reply))) => return Ok(reply),
            Ok(Err(OperationError::Documented(e))) => return Err(e),
            Ok(Ok(None)) => "execution chain produced no reply".to_string(),
            Ok(Err(OperationError::Internal(e))) => format!("{e:#}"),
            Err(payload) => panic_detail(&*payload),
        };
        Err(self.report(
            RoutingError::Unexpected {
                stage: "Unexpected failure during operation execution",
                detail: failure,
            },
            request,
            session,
        ))
    }

    /// Releases the session's operation-service backend.
    ///
    /// # Errors
    ///
    /// Propagates the backend's close failure.
    pub async fn close(&self) -> anyhow::Result<()> {
        self.registry.close().await
    }

    /// Ranks every operation and links the candidates into a chain.
    fn build_chain(
        &self,
        request: &Document,
        session: &Arc<NetconfServerSession>,
    ) -> Result<ChainedExecution, RoutingError> {
        let candidates = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.collect_candidates(request, session)
        }))
        .map_err(|payload| RoutingError::Unexpected {
            stage: "Unexpected failure while ranking operations",
            detail: panic_detail(&*payload),
        })??;

        if candidates.is_empty() {
            return Err(RoutingError::NoHandler {
                message: self.render(request),
            });
        }
        Ok(candidates.into_chain())
    }

    fn collect_candidates(
        &self,
        request: &Document,
        session: &Arc<NetconfServerSession>,
    ) -> Result<CandidateSet, RoutingError> {
        let operations = self.registry.operations();

        // Every binding happens before the first probe.
        for op in operations.iter().filter(|op| op.requires_session()) {
            op.bind_session(session);
        }

        let mut candidates = CandidateSet::new();
        for op in operations {
            let priority = op.can_handle(request);
            candidates
                .insert(priority, Arc::clone(op))
                .map_err(|conflict| RoutingError::Ambiguous {
                    message: self.render(request),
                    conflict,
                })?;
        }
        Ok(candidates)
    }

    fn render(&self, request: &Document) -> String {
        request.render_truncated(self.config.max_rendered_message_len)
    }

    fn report(
        &self,
        err: RoutingError,
        request: &Document,
        session: &NetconfServerSession,
    ) -> DocumentedError {
        match &err {
            RoutingError::NoHandler { .. } => {
                warn!(session_id = %session.id(), error = %err, "unable to handle rpc");
            }
            RoutingError::Ambiguous { conflict, .. } => {
                error!(
                    session_id = %session.id(),
                    priority = %conflict.priority,
                    existing = %conflict.existing,
                    conflicting = %conflict.conflicting,
                    error = %err,
                    "ambiguous operation registration"
                );
            }
            RoutingError::Unexpected { stage, detail } => {
                error!(session_id = %session.id(), detail = %detail, "{stage}");
            }
        }
        err.into_documented(&self.render(request), session)
    }
}

// ---------------------------------------------------------------------------
// RouterService (tower adapter)
// ---------------------------------------------------------------------------

/// One request bound to the session it arrived on.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    pub document: Document,
    pub session: Arc<NetconfServerSession>,
}

impl RpcRequest {
    #[must_use]
    pub fn new(document: Document, session: Arc<NetconfServerSession>) -> Self {
        Self { document, session }
    }
}

type BoxedFuture = Pin<Box<dyn Future<Output = Result<Document, DocumentedError>> + Send>>;

/// Exposes a shared `OperationRouter` as a `tower::Service<RpcRequest>`.
#[derive(Clone)]
pub struct RouterService {
    router: Arc<OperationRouter>,
}

impl RouterService {
    #[must_use]
    pub fn new(router: Arc<OperationRouter>) -> Self {
        Self { router }
    }
}

impl Service<RpcRequest> for RouterService {
    type Response = Document;
    type Error = DocumentedError;
    type Future = BoxedFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RpcRequest) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move { router.route(&req.document, &req.session).await })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use std::sync::Arc;

use async_trait::async_trait;
use netconf_core::{Document, DocumentedError, HandlingPriority, SessionId, BASE_NAMESPACE};
use tracing::{debug, warn};

use super::singleton_priority;
use crate::service::chain::ChainedExecution;
use crate::service::operation::{NetconfOperation, OperationError};
use crate::service::registry::SessionResources;
use crate::session::{NetconfServerSession, SessionBinding};

pub const CLOSE_SESSION: &str = "close-session";

/// `<close-session>`: releases the session's operation resources and asks the
/// session layer to tear the session down after replying `<ok/>`.
pub struct DefaultCloseSession {
    session_id: SessionId,
    name: String,
    resources: Arc<SessionResources>,
    session: SessionBinding,
}

impl DefaultCloseSession {
    #[must_use]
    pub fn new(session_id: SessionId, resources: Arc<SessionResources>) -> Self {
        Self {
            session_id,
            name: format!("{CLOSE_SESSION}(session {session_id})"),
            resources,
            session: SessionBinding::new(),
        }
    }
}

#[async_trait]
impl NetconfOperation for DefaultCloseSession {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires_session(&self) -> bool {
        true
    }

    fn bind_session(&self, session: &Arc<NetconfServerSession>) {
        self.session.bind(session);
    }

    fn can_handle(&self, request: &Document) -> HandlingPriority {
        singleton_priority(request, CLOSE_SESSION, BASE_NAMESPACE)
    }

    async fn handle(
        &self,
        request: &Document,
        _subsequent: &ChainedExecution,
    ) -> Result<Document, OperationError> {
        if let Err(e) = self.resources.close().await {
            warn!(session_id = %self.session_id, error = %e, "failed to release session resources");
            return Err(DocumentedError::operation_failed(format!(
                "Unable to properly close session {}",
                self.session_id
            ))
            .with_info("error", format!("{e:#}"))
            .into());
        }

        match self.session.current() {
            Some(session) => session.request_close(),
            None => debug!(session_id = %self.session_id, "close-session without a bound session"),
        }
        debug!(session_id = %self.session_id, "session resources released");
        Ok(Document::ok_reply(request))
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use netconf_core::{
    Document, DocumentedError, ErrorTag, HandlingPriority, SessionId, EXI_NAMESPACE,
};
use tracing::debug;

use super::{no_session_bound, singleton_priority};
use crate::service::chain::ChainedExecution;
use crate::service::operation::{NetconfOperation, OperationError};
use crate::session::{ExiAlignment, ExiParameters, NetconfServerSession, SessionBinding};

pub const START_EXI: &str = "start-exi";
pub const STOP_EXI: &str = "stop-exi";

const ALIGNMENT: &str = "alignment";

// ---------------------------------------------------------------------------
// start-exi
// ---------------------------------------------------------------------------

/// `<start-exi>`: switches the bound session to EXI encoding.
pub struct DefaultStartExi {
    name: String,
    session: SessionBinding,
}

impl DefaultStartExi {
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            name: format!("{START_EXI}(session {session_id})"),
            session: SessionBinding::new(),
        }
    }
}

/// Reads the EXI parameters carried by a `<start-exi>` request.
fn parse_exi_parameters(request: &Document) -> Result<ExiParameters, DocumentedError> {
    let alignment = match request.rpc_operation().and_then(|op| op.child_text(ALIGNMENT)) {
        None => ExiAlignment::default(),
        Some(value) => ExiAlignment::parse(value).ok_or_else(|| {
            DocumentedError::application(
                format!("Unsupported EXI alignment '{value}'"),
                ErrorTag::InvalidValue,
            )
            .with_info("bad-element", ALIGNMENT)
        })?,
    };
    Ok(ExiParameters { alignment })
}

#[async_trait]
impl NetconfOperation for DefaultStartExi {
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
        singleton_priority(request, START_EXI, EXI_NAMESPACE)
    }

    async fn handle(
        &self,
        request: &Document,
        _subsequent: &ChainedExecution,
    ) -> Result<Document, OperationError> {
        let session = self.session.current().ok_or_else(|| no_session_bound(START_EXI))?;
        let params = parse_exi_parameters(request)?;
        session.start_exi(params);
        debug!(session_id = %session.id(), alignment = params.alignment.as_str(), "EXI started");
        Ok(Document::ok_reply(request))
    }
}

// ---------------------------------------------------------------------------
// stop-exi
// ---------------------------------------------------------------------------

/// `<stop-exi>`: switches the bound session back to plain XML.
pub struct DefaultStopExi {
    name: String,
    session: SessionBinding,
}

impl DefaultStopExi {
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            name: format!("{STOP_EXI}(session {session_id})"),
            session: SessionBinding::new(),
        }
    }
}

#[async_trait]
impl NetconfOperation for DefaultStopExi {
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
        singleton_priority(request, STOP_EXI, EXI_NAMESPACE)
    }

    async fn handle(
        &self,
        request: &Document,
        _subsequent: &ChainedExecution,
    ) -> Result<Document, OperationError> {
        let session = self.session.current().ok_or_else(|| no_session_bound(STOP_EXI))?;
        let previous = session.stop_exi();
        debug!(session_id = %session.id(), was_active = previous.is_some(), "EXI stopped");
        Ok(Document::ok_reply(request))
    }
}

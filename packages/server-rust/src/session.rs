//! Server-side session state visible to operations.
//!
//! Transport and framing live elsewhere; this is only the part of a session
//! that operations read or mutate: its identifier, the negotiated EXI
//! compression parameters, and whether the peer asked to close it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use netconf_core::SessionId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EXI parameters
// ---------------------------------------------------------------------------

/// EXI stream alignment requested by `<start-exi>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExiAlignment {
    #[default]
    BitPacked,
    ByteAligned,
    PreCompression,
    Compression,
}

impl ExiAlignment {
    /// Parses the `<alignment>` value. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bit-packed" => Some(Self::BitPacked),
            "byte-aligned" => Some(Self::ByteAligned),
            "pre-compression" => Some(Self::PreCompression),
            "compression" => Some(Self::Compression),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BitPacked => "bit-packed",
            Self::ByteAligned => "byte-aligned",
            Self::PreCompression => "pre-compression",
            Self::Compression => "compression",
        }
    }
}

/// Negotiated EXI compression parameters of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExiParameters {
    pub alignment: ExiAlignment,
}

// ---------------------------------------------------------------------------
// NetconfServerSession
// ---------------------------------------------------------------------------

/// State of one connected client, shared between the session layer and the
/// operations bound to it.
#[derive(Debug)]
pub struct NetconfServerSession {
    id: SessionId,
    exi: RwLock<Option<ExiParameters>>,
    close_requested: AtomicBool,
}

impl NetconfServerSession {
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            exi: RwLock::new(None),
            close_requested: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Switches the session to EXI encoding after the current reply is sent.
    pub fn start_exi(&self, params: ExiParameters) {
        *self.exi.write() = Some(params);
    }

    /// Switches the session back to plain XML. Returns the previous parameters.
    pub fn stop_exi(&self) -> Option<ExiParameters> {
        self.exi.write().take()
    }

    #[must_use]
    pub fn exi_parameters(&self) -> Option<ExiParameters> {
        *self.exi.read()
    }

    /// Marks the session for teardown once the current reply is written.
    pub fn request_close(&self) {
        self.close_requested.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_close_requested(&self) -> bool {
        self.close_requested.load(Ordering::Acquire)
    }
}

impl fmt::Display for NetconfServerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session {}", self.id)
    }
}

// ---------------------------------------------------------------------------
// SessionBinding
// ---------------------------------------------------------------------------

/// Slot through which a session-aware operation sees the session it serves.
///
/// Holds a weak reference so an operation never keeps a retired session alive.
#[derive(Debug, Default)]
pub struct SessionBinding {
    slot: RwLock<Weak<NetconfServerSession>>,
}

impl SessionBinding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, session: &Arc<NetconfServerSession>) {
        *self.slot.write() = Arc::downgrade(session);
    }

    /// The bound session, or `None` if nothing is bound or it was dropped.
    #[must_use]
    pub fn current(&self) -> Option<Arc<NetconfServerSession>> {
        self.slot.read().upgrade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exi_toggles() {
        let session = NetconfServerSession::new(SessionId(3));
        assert!(session.exi_parameters().is_none());

        let params = ExiParameters {
            alignment: ExiAlignment::ByteAligned,
        };
        session.start_exi(params);
        assert_eq!(session.exi_parameters(), Some(params));
        assert_eq!(session.stop_exi(), Some(params));
        assert!(session.exi_parameters().is_none());
    }

    #[test]
    fn close_request_is_sticky() {
        let session = NetconfServerSession::new(SessionId(3));
        assert!(!session.is_close_requested());
        session.request_close();
        session.request_close();
        assert!(session.is_close_requested());
        assert_eq!(session.to_string(), "session 3");
    }

    #[test]
    fn alignment_parse_roundtrips_known_values() {
        for alignment in [
            ExiAlignment::BitPacked,
            ExiAlignment::ByteAligned,
            ExiAlignment::PreCompression,
            ExiAlignment::Compression,
        ] {
            assert_eq!(ExiAlignment::parse(alignment.as_str()), Some(alignment));
        }
        assert_eq!(ExiAlignment::parse("strict"), None);
    }

    #[test]
    fn binding_does_not_outlive_session() {
        let binding = SessionBinding::new();
        assert!(binding.current().is_none());

        let session = Arc::new(NetconfServerSession::new(SessionId(9)));
        binding.bind(&session);
        assert_eq!(binding.current().map(|s| s.id()), Some(SessionId(9)));

        drop(session);
        assert!(binding.current().is_none());
    }
}

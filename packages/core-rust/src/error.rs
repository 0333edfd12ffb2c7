//! Documented protocol errors: the structured `<rpc-error>` payload reported to peers.
//!
//! Turning a `DocumentedError` into an `<rpc-error>` element is the session
//! layer's job; this module only carries the classification and diagnostics.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Conceptual layer the error was reported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

impl ErrorType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Rpc => "rpc",
            Self::Protocol => "protocol",
            Self::Application => "application",
        }
    }
}

/// Machine-readable reason for the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorTag {
    InUse,
    InvalidValue,
    TooBig,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    UnknownNamespace,
    AccessDenied,
    LockDenied,
    ResourceDenied,
    RollbackFailed,
    DataExists,
    DataMissing,
    OperationNotSupported,
    OperationFailed,
    PartialOperation,
    MalformedMessage,
}

impl ErrorTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InUse => "in-use",
            Self::InvalidValue => "invalid-value",
            Self::TooBig => "too-big",
            Self::MissingAttribute => "missing-attribute",
            Self::BadAttribute => "bad-attribute",
            Self::UnknownAttribute => "unknown-attribute",
            Self::MissingElement => "missing-element",
            Self::BadElement => "bad-element",
            Self::UnknownElement => "unknown-element",
            Self::UnknownNamespace => "unknown-namespace",
            Self::AccessDenied => "access-denied",
            Self::LockDenied => "lock-denied",
            Self::ResourceDenied => "resource-denied",
            Self::RollbackFailed => "rollback-failed",
            Self::DataExists => "data-exists",
            Self::DataMissing => "data-missing",
            Self::OperationNotSupported => "operation-not-supported",
            Self::OperationFailed => "operation-failed",
            Self::PartialOperation => "partial-operation",
            Self::MalformedMessage => "malformed-message",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

impl ErrorSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(ErrorType, ErrorTag, ErrorSeverity);

// ---------------------------------------------------------------------------
// DocumentedError
// ---------------------------------------------------------------------------

/// A protocol error with full `<rpc-error>` classification.
///
/// `message` is the human-readable `error-message`; `info` holds the
/// diagnostic key/text pairs destined for `error-info`. Internal failure
/// details belong in `info`, never in the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} ({error_type}/{error_tag}/{severity})")]
pub struct DocumentedError {
    pub message: String,
    pub error_type: ErrorType,
    pub error_tag: ErrorTag,
    pub severity: ErrorSeverity,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub info: BTreeMap<String, String>,
}

impl DocumentedError {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        error_type: ErrorType,
        error_tag: ErrorTag,
        severity: ErrorSeverity,
    ) -> Self {
        Self {
            message: message.into(),
            error_type,
            error_tag,
            severity,
            info: BTreeMap::new(),
        }
    }

    /// Application-level error with severity `error`, the common case.
    #[must_use]
    pub fn application(message: impl Into<String>, error_tag: ErrorTag) -> Self {
        Self::new(message, ErrorType::Application, error_tag, ErrorSeverity::Error)
    }

    #[must_use]
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::application(message, ErrorTag::OperationFailed)
    }

    /// Adds one diagnostic entry, replacing an existing value for `key`.
    #[must_use]
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }
}

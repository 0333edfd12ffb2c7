//! NETCONF core: document model, handling priorities, and documented protocol errors.

pub mod document;
pub mod error;
pub mod priority;
pub mod types;

pub use document::{Document, XmlElement, BASE_NAMESPACE, EXI_NAMESPACE};
pub use error::{DocumentedError, ErrorSeverity, ErrorTag, ErrorType};
pub use priority::HandlingPriority;
pub use types::SessionId;

//! Error types for Planbridge

use thiserror::Error;

use crate::value::ForeignObjectId;

/// Main error type for Planbridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// An accessor/mutator name does not resolve on the target object.
    ///
    /// Indicates a caller/schema mismatch and is always propagated.
    #[error("attribute `{name}` not found on `{class}`")]
    AttributeNotFound { class: String, name: String },

    /// A value offered for boxing has no cross-runtime representation.
    #[error("marshaling error: {0}")]
    Marshal(String),

    /// The class generator rejected the collected marker metadata.
    #[error("class synthesis error: {0}")]
    ClassSynthesis(String),

    /// Error in solver configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// No live object is registered under the given identity.
    #[error("no object registered for id {0}")]
    UnknownObject(ForeignObjectId),

    /// Internal error (should not occur in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for Planbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

//! Graph error types.

use thiserror::Error;

/// Errors that can occur while building or reading graphs.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Edge refers to a node that does not exist
    #[error("Edge {source_id} -> {target_id} refers to an unknown node")]
    DanglingEdge {
        /// Edge source
        source_id: String,
        /// Edge target
        target_id: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

//! Topic pipeline error types.

use thiserror::Error;

/// Errors that can occur while assigning topics.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// Too few papers survived concept filtering to cluster
    #[error("Insufficient data: {papers} paper(s) remain after concept filtering, clustering needs at least 2")]
    InsufficientData {
        /// Papers left in the concept matrix
        papers: usize,
    },

    /// Clustering error
    #[error("Clustering error: {0}")]
    Clustering(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Shared type validation error
    #[error(transparent)]
    Types(#[from] pubtopics_types::PubTopicsError),
}

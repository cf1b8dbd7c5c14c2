//! # pubtopics-types
//!
//! Shared domain types for the publication topic pipeline.
//!
//! This crate defines the records exchanged between the pipeline stages:
//! - Papers: publication metadata keyed by work id
//! - Concept records: per-paper concept tags with relevance scores
//! - Topics: keyword-defined or discovered topic identifiers
//! - Settings: layered configuration for the `pubtopics` binary
//!
//! ## Usage
//!
//! ```rust
//! use pubtopics_types::{ConceptRecord, TopicId, UNASSIGNED_TOPIC};
//!
//! let record = ConceptRecord::new("W1", "Concrete durability", 0.8);
//! assert_eq!(record.paper_id, "W1");
//! let unassigned: TopicId = UNASSIGNED_TOPIC;
//! assert_eq!(unassigned, -1);
//! ```

pub mod config;
pub mod error;
pub mod paper;
pub mod topic;

pub use config::{OverlayConfig, Settings, TopicsConfig};
pub use error::PubTopicsError;
pub use paper::{ConceptRecord, Paper, PaperId};
pub use topic::{
    Assignment, TopicAssignment, TopicDefinition, TopicId, TopicSummaryRow, UNASSIGNED_TOPIC,
};

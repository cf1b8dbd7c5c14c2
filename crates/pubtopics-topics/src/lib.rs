//! # pubtopics-topics
//!
//! Topic assignment for a researcher's publications.
//!
//! Papers carry weighted concept tags from a bibliographic service. This crate
//! turns those sparse concept vectors into one topic per paper and summarizes
//! each topic by its most representative concepts.
//!
//! ## Features
//! - Keyword mode: greedy classification against a hand-authored taxonomy
//! - Discovery mode: allow-list denoising, cosine distances and average-linkage
//!   agglomerative clustering into at most four topics
//! - Per-topic concept summaries with pinned, reproducible ordering
//!
//! Both modes implement [`TopicResolver`], so the pipeline and the summary
//! always see the same concept records that produced the assignment.

pub mod agglomerative;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod filter;
pub mod matrix;
pub mod pipeline;
pub mod similarity;
pub mod store;
pub mod summary;

pub use agglomerative::average_linkage;
pub use catalog::{KeywordCatalog, Resolution, TopicMode, TopicResolver};
pub use engine::ClusterEngine;
pub use error::TopicsError;
pub use filter::{is_allowed, AllowList};
pub use matrix::ConceptMatrix;
pub use pipeline::{assignment_rows, AssignmentRow, PipelineOutput, PipelineReport, TopicPipeline};
pub use similarity::{cosine_similarity, pairwise_distances};
pub use store::ConceptStore;
pub use summary::SummaryBuilder;

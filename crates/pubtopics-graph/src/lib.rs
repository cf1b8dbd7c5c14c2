//! # pubtopics-graph
//!
//! Citation graph model and the topic overlay rendered on the lab website.
//!
//! ## Features
//! - Node-link citation graph with typed nodes and edges
//! - Graph construction from the works table and citation records
//! - Topic overlay: topic hubs linked to their papers, author spokes removed
//! - Deterministic topic palette shared with the renderer

pub mod builder;
pub mod error;
pub mod model;
pub mod overlay;
pub mod palette;
pub mod weight;

pub use builder::{CitationGraphBuilder, CitationRecord};
pub use error::GraphError;
pub use model::{CitationGraph, EdgeType, GraphEdge, GraphNode, NodeType};
pub use overlay::{topic_node_id, GraphOverlay, NodeStyle, OverlayEdge, OverlayGraph, OverlayNode};
pub use palette::{color_for_topic, UNASSIGNED_COLOR};
pub use weight::coerce_weight;

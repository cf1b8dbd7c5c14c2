//! Topic overlay on the citation graph.
//!
//! The overlay turns the author-centric citation graph into a topic-centric
//! one: every topic becomes a hub linked to its papers, and the target
//! author's `authored` spokes are dropped so papers group around topics
//! instead of radiating from the author. Citation edges stay.

use std::collections::{BTreeMap, HashSet};

use pubtopics_types::{Assignment, PaperId, TopicId, UNASSIGNED_TOPIC};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::model::{CitationGraph, EdgeType, NodeType};
use crate::palette::{color_for_topic, AUTHOR_COLOR, CITING_AUTHOR_COLOR, OTHER_COLOR};
use crate::weight::coerce_weight;

/// Presentation hints for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    /// Fill color
    pub color: String,
    /// Node size in pixels
    pub size: u32,
    /// Shape name (`dot`, `box`)
    pub shape: String,
}

impl NodeStyle {
    fn new(color: &str, size: u32, shape: &str) -> Self {
        Self {
            color: color.to_string(),
            size,
            shape: shape.to_string(),
        }
    }
}

/// A node of the augmented graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayNode {
    /// Node id
    pub id: String,
    /// Node kind
    pub node_type: NodeType,
    /// Visible label; `None` hides it and shows the title on hover only
    pub label: Option<String>,
    /// Hover text
    pub title: String,
    /// Resolved topic (papers and topic hubs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<TopicId>,
    /// Presentation hints
    pub style: NodeStyle,
}

/// An edge of the augmented graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEdge {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Edge kind
    pub edge_type: EdgeType,
    /// Numeric weight
    pub weight: f64,
    /// Topic color for topic edges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Citation graph augmented with topic hubs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayGraph {
    /// Topic hubs first, then the citation graph's nodes
    pub nodes: Vec<OverlayNode>,
    /// Topic edges first, then preserved citation edges
    pub edges: Vec<OverlayEdge>,
}

impl OverlayGraph {
    /// Topic hub nodes.
    pub fn topic_nodes(&self) -> impl Iterator<Item = &OverlayNode> {
        self.nodes.iter().filter(|n| n.node_type == NodeType::Topic)
    }

    /// Edges of one type.
    pub fn edges_of_type<'a>(&'a self, edge_type: &'a EdgeType) -> impl Iterator<Item = &'a OverlayEdge> {
        self.edges.iter().filter(move |e| &e.edge_type == edge_type)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&OverlayNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Serialize to JSON for the renderer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Node id of a topic hub.
pub fn topic_node_id(topic_id: TopicId) -> String {
    format!("topic::{topic_id}")
}

/// Merges a topic assignment onto a citation graph.
#[derive(Debug, Clone, Default)]
pub struct GraphOverlay {
    include_unassigned: bool,
    titles: BTreeMap<PaperId, String>,
}

impl GraphOverlay {
    /// Create an overlay; unassigned papers get a hub only if requested.
    pub fn new(include_unassigned: bool) -> Self {
        Self {
            include_unassigned,
            titles: BTreeMap::new(),
        }
    }

    /// Use these paper titles as hover text instead of node labels.
    pub fn with_titles(mut self, titles: BTreeMap<PaperId, String>) -> Self {
        self.titles = titles;
        self
    }

    /// Build the augmented graph.
    #[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
    pub fn apply(&self, graph: &CitationGraph, assignment: &Assignment) -> OverlayGraph {
        let mut overlay = OverlayGraph::default();
        let mut hubs: HashSet<TopicId> = HashSet::new();

        for topic_id in assignment.topic_ids() {
            if topic_id == UNASSIGNED_TOPIC && !self.include_unassigned {
                continue;
            }
            hubs.insert(topic_id);
            overlay.nodes.push(self.topic_node(topic_id, assignment));
        }

        for node in graph.nodes() {
            let label = node.display_label().to_string();
            let overlay_node = match node.node_type {
                NodeType::TargetAuthor => OverlayNode {
                    id: node.id.clone(),
                    node_type: node.node_type.clone(),
                    label: Some(label.clone()),
                    title: label,
                    topic_id: None,
                    style: NodeStyle::new(AUTHOR_COLOR, 30, "dot"),
                },
                NodeType::TargetWork => {
                    if assignment.get(&node.id).is_none() {
                        debug!(paper_id = %node.id, "Paper has no topic assignment");
                    }
                    let topic_id = assignment.topic_of(&node.id);
                    let title = self.titles.get(&node.id).cloned().unwrap_or(label);
                    OverlayNode {
                        id: node.id.clone(),
                        node_type: node.node_type.clone(),
                        label: None,
                        title,
                        topic_id: Some(topic_id),
                        style: NodeStyle::new(color_for_topic(topic_id), 14, "dot"),
                    }
                }
                NodeType::CitingAuthor => OverlayNode {
                    id: node.id.clone(),
                    node_type: node.node_type.clone(),
                    label: None,
                    title: label,
                    topic_id: None,
                    style: NodeStyle::new(CITING_AUTHOR_COLOR, 8, "dot"),
                },
                _ => OverlayNode {
                    id: node.id.clone(),
                    node_type: node.node_type.clone(),
                    label: None,
                    title: label,
                    topic_id: None,
                    style: NodeStyle::new(OTHER_COLOR, 6, "dot"),
                },
            };
            overlay.nodes.push(overlay_node);
        }

        for (paper_id, resolved) in assignment.iter() {
            if !hubs.contains(&resolved.topic_id) {
                continue;
            }
            if !graph.has_node(paper_id) {
                debug!(paper_id = %paper_id, "Assigned paper not in citation graph");
                continue;
            }
            overlay.edges.push(OverlayEdge {
                source: topic_node_id(resolved.topic_id),
                target: paper_id.clone(),
                edge_type: EdgeType::TopicPaper,
                weight: 1.0,
                color: Some(color_for_topic(resolved.topic_id).to_string()),
            });
        }

        let mut dropped = 0usize;
        let mut implicit: HashSet<&str> = HashSet::new();
        for edge in graph.edges() {
            if edge.edge_type == EdgeType::Authored {
                dropped += 1;
                continue;
            }
            for endpoint in [&edge.source, &edge.target] {
                if !graph.has_node(endpoint) && implicit.insert(endpoint.as_str()) {
                    debug!(node_id = %endpoint, "Edge endpoint not declared, adding untyped node");
                    overlay.nodes.push(OverlayNode {
                        id: endpoint.clone(),
                        node_type: NodeType::Unknown,
                        label: None,
                        title: endpoint.clone(),
                        topic_id: None,
                        style: NodeStyle::new(OTHER_COLOR, 6, "dot"),
                    });
                }
            }
            overlay.edges.push(OverlayEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                edge_type: edge.edge_type.clone(),
                weight: coerce_weight(edge.weight.as_ref()),
                color: None,
            });
        }

        info!(
            topics = hubs.len(),
            nodes = overlay.nodes.len(),
            edges = overlay.edges.len(),
            dropped_authored = dropped,
            implicit_nodes = implicit.len(),
            "Built topic overlay"
        );

        overlay
    }

    fn topic_node(&self, topic_id: TopicId, assignment: &Assignment) -> OverlayNode {
        let name = assignment.topic_name(topic_id).filter(|n| !n.is_empty());
        let label = match (topic_id, name) {
            (_, Some(name)) => name.to_string(),
            (UNASSIGNED_TOPIC, None) => "Unassigned".to_string(),
            (id, None) => format!("Topic {id}"),
        };
        let title = match name {
            Some(name) => format!("Topic {topic_id}: {name}"),
            None => label.clone(),
        };

        OverlayNode {
            id: topic_node_id(topic_id),
            node_type: NodeType::Topic,
            label: Some(label),
            title,
            topic_id: Some(topic_id),
            style: NodeStyle::new(color_for_topic(topic_id), 28, "box"),
        }
    }
}

//! Node-link citation graph.
//!
//! The serialized form follows the node-link layout (`nodes` plus `edges`,
//! `links` accepted as an alias). Unknown node and edge attributes are kept
//! verbatim.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphError;

/// Kind of node in the citation graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// The researcher whose publications are shown
    TargetAuthor,
    /// A publication of the target author
    TargetWork,
    /// An author of a work citing one of the target works
    CitingAuthor,
    /// A topic hub added by the overlay
    Topic,
    /// Missing or empty type
    #[default]
    Unknown,
    /// Any other named type
    Other(String),
}

impl NodeType {
    /// Wire name of the node type.
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::TargetAuthor => "target_author",
            NodeType::TargetWork => "target_work",
            NodeType::CitingAuthor => "citing_author",
            NodeType::Topic => "topic",
            NodeType::Unknown => "",
            NodeType::Other(name) => name,
        }
    }
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "target_author" => NodeType::TargetAuthor,
            "target_work" => NodeType::TargetWork,
            "citing_author" => NodeType::CitingAuthor,
            "topic" => NodeType::Topic,
            "" => NodeType::Unknown,
            _ => NodeType::Other(name),
        }
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.as_str().to_string()
    }
}

/// Kind of edge in the citation graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeType {
    /// Target author wrote the target work
    Authored,
    /// Citing author cited the target work
    CitesTargetWork,
    /// Topic hub claims the paper
    TopicPaper,
    /// Untyped edge
    #[default]
    Unknown,
    /// Any other named type
    Other(String),
}

impl EdgeType {
    /// Wire name of the edge type.
    pub fn as_str(&self) -> &str {
        match self {
            EdgeType::Authored => "authored",
            EdgeType::CitesTargetWork => "cites_target_work",
            EdgeType::TopicPaper => "topic_paper",
            EdgeType::Unknown => "",
            EdgeType::Other(name) => name,
        }
    }
}

impl From<String> for EdgeType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "authored" => EdgeType::Authored,
            "cites_target_work" => EdgeType::CitesTargetWork,
            "topic_paper" => EdgeType::TopicPaper,
            "" => EdgeType::Unknown,
            _ => EdgeType::Other(name),
        }
    }
}

impl From<EdgeType> for String {
    fn from(edge_type: EdgeType) -> Self {
        edge_type.as_str().to_string()
    }
}

/// A node with its type, display label and free-form attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique node id (author or work URL)
    pub id: String,
    /// Node kind
    #[serde(default)]
    pub node_type: NodeType,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Remaining attributes (doi, year, orcid, institution, ...)
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl GraphNode {
    /// Create a node with a label and no extra attributes.
    pub fn new(id: impl Into<String>, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: Some(label.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a string attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), Value::String(value.into()));
        self
    }

    /// Label, falling back to the node id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// An edge with its type and raw weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Edge kind
    #[serde(default)]
    pub edge_type: EdgeType,
    /// Raw weight as read; may be missing or malformed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Value>,
    /// Remaining attributes
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl GraphEdge {
    /// Create an edge with a numeric weight.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: EdgeType,
        weight: f64,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type,
            weight: serde_json::Number::from_f64(weight).map(Value::Number),
            attributes: BTreeMap::new(),
        }
    }
}

#[derive(Deserialize)]
struct NodeLinkData {
    #[serde(default)]
    nodes: Vec<GraphNode>,
    #[serde(default, alias = "links")]
    edges: Vec<GraphEdge>,
}

/// Citation graph with node lookup by id.
///
/// Nodes and edges keep insertion order, which is also the order the overlay
/// emits them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeLinkData")]
pub struct CitationGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl From<NodeLinkData> for CitationGraph {
    fn from(data: NodeLinkData) -> Self {
        let mut graph = CitationGraph::new();
        for node in data.nodes {
            graph.add_node(node);
        }
        for edge in data.edges {
            graph.add_edge(edge);
        }
        graph
    }
}

impl CitationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a node-link JSON document.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to node-link JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insert a node; a node with the same id is replaced in place.
    pub fn add_node(&mut self, node: GraphNode) {
        match self.index.get(&node.id) {
            Some(&pos) => self.nodes[pos] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Append an edge.
    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Nodes of one type.
    pub fn nodes_of_type<'a>(&'a self, node_type: &'a NodeType) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes.iter().filter(move |n| &n.node_type == node_type)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check that every edge connects existing nodes.
    pub fn validate(&self) -> Result<(), GraphError> {
        match self
            .edges
            .iter()
            .find(|e| !self.has_node(&e.source) || !self.has_node(&e.target))
        {
            Some(edge) => Err(GraphError::DanglingEdge {
                source_id: edge.source.clone(),
                target_id: edge.target.clone(),
            }),
            None => Ok(()),
        }
    }
}

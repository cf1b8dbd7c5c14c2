//! Citation graph construction from tabular inputs.

use std::collections::{BTreeMap, HashSet};

use pubtopics_types::Paper;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{CitationGraph, EdgeType, GraphEdge, GraphNode, NodeType};

/// One author of one work citing a target work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationRecord {
    /// Citing author id
    pub from_author_id: String,
    /// Citing author display name
    pub from_author_name: String,
    /// Cited target work id
    pub to_work_id: String,
    /// Citing work id, if known
    #[serde(default)]
    pub citing_work_id: Option<String>,
    /// First listed institution of the citing author
    #[serde(default)]
    pub institution: Option<String>,
    /// ORCID of the citing author
    #[serde(default)]
    pub orcid: Option<String>,
}

impl CitationRecord {
    /// Create a record with only the required fields.
    pub fn new(
        from_author_id: impl Into<String>,
        from_author_name: impl Into<String>,
        to_work_id: impl Into<String>,
    ) -> Self {
        Self {
            from_author_id: from_author_id.into(),
            from_author_name: from_author_name.into(),
            to_work_id: to_work_id.into(),
            citing_work_id: None,
            institution: None,
            orcid: None,
        }
    }
}

#[derive(Debug, Clone)]
struct CitingAuthor {
    name: String,
    orcid: String,
    institution: String,
}

/// Builds the author/work/citing-author graph.
///
/// Every author of every citing work adds one citation of the cited work; a
/// citing author who cites the same work several times gets a single edge
/// whose weight is the citation count. The first metadata seen for a citing
/// author wins.
#[derive(Debug, Clone)]
pub struct CitationGraphBuilder {
    author_id: String,
    author_name: String,
    author_orcid: Option<String>,
    works: Vec<Paper>,
    work_ids: HashSet<String>,
    citing_authors: Vec<(String, CitingAuthor)>,
    citing_index: HashSet<String>,
    citations: BTreeMap<(String, String), u32>,
    citation_order: Vec<(String, String)>,
}

impl CitationGraphBuilder {
    /// Start a graph around the target author.
    pub fn new(author_id: impl Into<String>, author_name: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            author_name: author_name.into(),
            author_orcid: None,
            works: Vec::new(),
            work_ids: HashSet::new(),
            citing_authors: Vec::new(),
            citing_index: HashSet::new(),
            citations: BTreeMap::new(),
            citation_order: Vec::new(),
        }
    }

    /// Attach the target author's ORCID.
    pub fn orcid(mut self, orcid: impl Into<String>) -> Self {
        self.author_orcid = Some(orcid.into());
        self
    }

    /// Add a target work; duplicates are ignored.
    pub fn add_work(&mut self, paper: &Paper) -> &mut Self {
        if paper.paper_id.is_empty() {
            debug!("Skipping work without id");
        } else if self.work_ids.insert(paper.paper_id.clone()) {
            self.works.push(paper.clone());
        }
        self
    }

    /// Record that an author cited a target work.
    pub fn add_citation(&mut self, record: &CitationRecord) -> &mut Self {
        if record.from_author_id.is_empty() || record.from_author_name.is_empty() {
            debug!(work = %record.to_work_id, "Skipping citation without author");
            return self;
        }
        if !self.work_ids.contains(&record.to_work_id) {
            debug!(work = %record.to_work_id, "Citation of unknown work skipped");
            return self;
        }

        if self.citing_index.insert(record.from_author_id.clone()) {
            self.citing_authors.push((
                record.from_author_id.clone(),
                CitingAuthor {
                    name: record.from_author_name.clone(),
                    orcid: record.orcid.clone().unwrap_or_default(),
                    institution: record.institution.clone().unwrap_or_default(),
                },
            ));
        }

        let key = (record.from_author_id.clone(), record.to_work_id.clone());
        let count = self.citations.entry(key.clone()).or_insert(0);
        if *count == 0 {
            self.citation_order.push(key);
        }
        *count += 1;
        self
    }

    /// Produce the graph.
    pub fn build(&self) -> CitationGraph {
        let mut graph = CitationGraph::new();

        let mut author = GraphNode::new(&self.author_id, NodeType::TargetAuthor, &self.author_name);
        if let Some(orcid) = &self.author_orcid {
            author = author.with_attribute("orcid", format!("https://orcid.org/{orcid}"));
        }
        graph.add_node(author);

        for work in &self.works {
            let node = GraphNode::new(&work.paper_id, NodeType::TargetWork, &work.title)
                .with_attribute("doi", work.doi.clone().unwrap_or_default())
                .with_attribute("year", work.year.map(|y| y.to_string()).unwrap_or_default());
            graph.add_node(node);
        }

        for (id, meta) in &self.citing_authors {
            let node = GraphNode::new(id, NodeType::CitingAuthor, &meta.name)
                .with_attribute("orcid", meta.orcid.clone())
                .with_attribute("institution", meta.institution.clone());
            graph.add_node(node);
        }

        for key in &self.citation_order {
            let weight = self.citations.get(key).copied().unwrap_or(1);
            graph.add_edge(GraphEdge::new(
                &key.0,
                &key.1,
                EdgeType::CitesTargetWork,
                f64::from(weight),
            ));
        }

        for work in &self.works {
            graph.add_edge(GraphEdge::new(
                &self.author_id,
                &work.paper_id,
                EdgeType::Authored,
                1.0,
            ));
        }

        info!(
            works = self.works.len(),
            citing_authors = self.citing_authors.len(),
            citation_edges = self.citation_order.len(),
            "Built citation graph"
        );

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::coerce_weight;
    use pretty_assertions::assert_eq;

    fn builder() -> CitationGraphBuilder {
        let mut builder = CitationGraphBuilder::new("A0", "Target Author").orcid("0000-0001");
        let mut w1 = Paper::new("W1", "Precast joints");
        w1.year = Some(2021);
        w1.doi = Some("https://doi.org/10.1/abc".to_string());
        builder.add_work(&w1);
        builder.add_work(&Paper::new("W2", "Digital twins"));
        builder
    }

    #[test]
    fn test_node_layout() {
        let graph = builder().build();
        let types: Vec<&str> = graph.nodes().iter().map(|n| n.node_type.as_str()).collect();
        assert_eq!(types, vec!["target_author", "target_work", "target_work"]);
        let author = graph.node("A0").unwrap();
        assert_eq!(author.attributes["orcid"], "https://orcid.org/0000-0001");
        let work = graph.node("W1").unwrap();
        assert_eq!(work.attributes["year"], "2021");
        assert_eq!(work.attributes["doi"], "https://doi.org/10.1/abc");
    }

    #[test]
    fn test_repeated_citations_accumulate_weight() {
        let mut builder = builder();
        builder
            .add_citation(&CitationRecord::new("C1", "Lee", "W1"))
            .add_citation(&CitationRecord::new("C1", "Lee", "W1"))
            .add_citation(&CitationRecord::new("C1", "Lee", "W2"))
            .add_citation(&CitationRecord::new("C2", "Park", "W1"));
        let graph = builder.build();

        let cites: Vec<(&str, &str, f64)> = graph
            .edges()
            .iter()
            .filter(|e| e.edge_type == EdgeType::CitesTargetWork)
            .map(|e| (e.source.as_str(), e.target.as_str(), coerce_weight(e.weight.as_ref())))
            .collect();
        assert_eq!(
            cites,
            vec![("C1", "W1", 2.0), ("C1", "W2", 1.0), ("C2", "W1", 1.0)]
        );
    }

    #[test]
    fn test_authored_edges_per_work() {
        let graph = builder().build();
        let authored = graph
            .edges()
            .iter()
            .filter(|e| e.edge_type == EdgeType::Authored)
            .count();
        assert_eq!(authored, 2);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_first_author_metadata_wins() {
        let mut builder = builder();
        let mut first = CitationRecord::new("C1", "Lee", "W1");
        first.institution = Some("Chung-Ang University".to_string());
        let mut second = CitationRecord::new("C1", "Lee J.", "W2");
        second.institution = Some("Elsewhere".to_string());
        builder.add_citation(&first).add_citation(&second);

        let graph = builder.build();
        let node = graph.node("C1").unwrap();
        assert_eq!(node.label.as_deref(), Some("Lee"));
        assert_eq!(node.attributes["institution"], "Chung-Ang University");
    }

    #[test]
    fn test_skips_incomplete_and_unknown_citations() {
        let mut builder = builder();
        builder
            .add_citation(&CitationRecord::new("", "Nobody", "W1"))
            .add_citation(&CitationRecord::new("C3", "", "W1"))
            .add_citation(&CitationRecord::new("C4", "Choi", "W404"));
        let graph = builder.build();
        assert_eq!(graph.node_count(), 3);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_duplicate_works_ignored() {
        let mut builder = builder();
        builder.add_work(&Paper::new("W1", "Again"));
        let graph = builder.build();
        assert_eq!(graph.nodes_of_type(&NodeType::TargetWork).count(), 2);
        assert_eq!(graph.node("W1").unwrap().label.as_deref(), Some("Precast joints"));
    }
}

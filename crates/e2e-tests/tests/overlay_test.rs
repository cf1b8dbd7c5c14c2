//! End-to-end topic overlay tests.
//!
//! Builds the fixture citation graph, assigns topics and checks the
//! augmented graph: hubs, topic edges, dropped authorship edges and weight
//! coercion.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;

use e2e_tests::{lab_catalog, lab_graph, lab_store, TestHarness};
use pubtopics_cli::{build_graph, io, run_assign, run_overlay};
use pubtopics_graph::{
    topic_node_id, CitationGraph, EdgeType, GraphOverlay, NodeType, UNASSIGNED_COLOR,
};
use pubtopics_topics::TopicPipeline;
use pubtopics_types::{Assignment, TopicAssignment, UNASSIGNED_TOPIC};

fn lab_assignment() -> Assignment {
    TopicPipeline::default()
        .run(&lab_catalog(), &lab_store())
        .unwrap()
        .assignment
}

/// A malformed weight renders as 1.
#[test]
fn test_malformed_weight_defaults_to_one() {
    let graph = CitationGraph::from_json(
        r#"{
            "nodes": [
                {"id": "C1", "node_type": "citing_author", "label": "Park"},
                {"id": "W1", "node_type": "target_work", "label": "Joints"}
            ],
            "links": [
                {"source": "C1", "target": "W1", "edge_type": "cites_target_work", "weight": "abc"}
            ]
        }"#,
    )
    .unwrap();
    let mut assignment = Assignment::new();
    assignment.insert("W1", TopicAssignment::topic(0));

    let overlay = GraphOverlay::new(false).apply(&graph, &assignment);

    let cites: Vec<_> = overlay.edges_of_type(&EdgeType::CitesTargetWork).collect();
    assert_eq!(cites.len(), 1);
    assert_eq!(cites[0].weight, 1.0);
}

#[test]
fn test_overlay_drops_authored_edges() {
    let graph = lab_graph();
    assert!(graph.edges().iter().any(|e| e.edge_type == EdgeType::Authored));

    let overlay = GraphOverlay::new(true).apply(&graph, &lab_assignment());

    assert_eq!(overlay.edges_of_type(&EdgeType::Authored).count(), 0);
    let citations = graph
        .edges()
        .iter()
        .filter(|e| e.edge_type == EdgeType::CitesTargetWork)
        .count();
    assert_eq!(overlay.edges_of_type(&EdgeType::CitesTargetWork).count(), citations);
}

/// Each topic hub links exactly the papers assigned to it.
#[test]
fn test_topic_edges_target_own_papers() {
    let assignment = lab_assignment();
    let overlay = GraphOverlay::new(false).apply(&lab_graph(), &assignment);

    let mut targets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for edge in overlay.edges_of_type(&EdgeType::TopicPaper) {
        targets
            .entry(edge.source.clone())
            .or_default()
            .push(edge.target.clone());
    }

    for hub in overlay.topic_nodes() {
        let topic_id = hub.topic_id.unwrap();
        let expected: Vec<String> = assignment
            .papers_for(topic_id)
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(targets.get(&hub.id).cloned().unwrap_or_default(), expected);
    }
    assert!(!targets.contains_key(&topic_node_id(UNASSIGNED_TOPIC)));
}

#[test]
fn test_unassigned_hub_is_opt_in() {
    let assignment = lab_assignment();
    let graph = lab_graph();

    let without = GraphOverlay::new(false).apply(&graph, &assignment);
    assert_eq!(without.topic_nodes().count(), 3);
    assert!(without.node(&topic_node_id(UNASSIGNED_TOPIC)).is_none());

    let with = GraphOverlay::new(true).apply(&graph, &assignment);
    let hub = with.node(&topic_node_id(UNASSIGNED_TOPIC)).unwrap();
    assert_eq!(hub.label.as_deref(), Some("Unassigned"));
    assert_eq!(hub.style.color, UNASSIGNED_COLOR);

    let w4 = with.node("W4").unwrap();
    assert_eq!(w4.topic_id, Some(UNASSIGNED_TOPIC));
    assert_eq!(w4.style.color, UNASSIGNED_COLOR);
}

#[test]
fn test_overlay_node_styles() {
    let overlay = GraphOverlay::new(false).apply(&lab_graph(), &lab_assignment());

    let hub = overlay.node(&topic_node_id(1)).unwrap();
    assert_eq!(hub.node_type, NodeType::Topic);
    assert_eq!(hub.title, "Topic 1: intelligence");
    assert_eq!(hub.style.shape, "box");

    let author = overlay.node("A_kim").unwrap();
    assert_eq!(author.label.as_deref(), Some("Kim"));
    assert_eq!(author.style.color, "red");

    let paper = overlay.node("W2").unwrap();
    assert_eq!(paper.label, None);
    assert_eq!(paper.title, "Bridge deck monitoring with deep learning");
    assert_eq!(paper.style.color, hub.style.color);
}

/// build-graph, assign and overlay chained through files.
#[test]
fn test_command_chain_through_graphml() {
    let harness = TestHarness::new();
    let (works, concepts, topics) = harness.write_lab_tables();
    let citations = harness.write(
        "edges_citingAuthor_to_orcidWorks.csv",
        "from_author_id,from_author_name,to_work_id,citing_work_id,institution,orcid\n\
         A_park,Park,W1,X1,KAIST,\n\
         A_park,Park,W1,X2,KAIST,\n\
         A_lee,Lee,W2,X3,,0000-0002\n\
         A_lee,Lee,W9,X4,,0000-0002\n",
    );
    let graph_path = harness.root.join("vis/orcid_citation_network.graphml");

    let graph = build_graph(&works, &citations, "A_kim", "Kim", None, &graph_path).unwrap();
    let reread = io::read_graph(&graph_path).unwrap();
    assert_eq!(reread.node_count(), graph.node_count());
    assert_eq!(reread.edge_count(), graph.edge_count());

    let settings = harness.settings();
    run_assign(&settings, &works, &concepts, &topics).unwrap();

    let out = harness.root.join("vis/orcid_topic_network.json");
    let overlay = run_overlay(
        &settings,
        &graph_path,
        &harness.out_dir().join("paper_topics.csv"),
        &out,
    )
    .unwrap();

    let park = overlay
        .edges_of_type(&EdgeType::CitesTargetWork)
        .find(|e| e.source == "A_park")
        .unwrap();
    assert_eq!(park.weight, 2.0);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        written["nodes"].as_array().unwrap().len(),
        overlay.nodes.len()
    );
}

/// A citation from an undeclared node still renders, with an untyped endpoint.
#[test]
fn test_overlay_command_tolerates_dangling_citation() {
    let harness = TestHarness::new();
    let (works, concepts, topics) = harness.write_lab_tables();
    let settings = harness.settings();
    run_assign(&settings, &works, &concepts, &topics).unwrap();

    let graph_path = harness.write(
        "citation_network.json",
        r#"{
            "nodes": [
                {"id": "A_kim", "node_type": "target_author", "label": "Kim"},
                {"id": "W1", "node_type": "target_work", "label": "Joints"}
            ],
            "links": [
                {"source": "A_kim", "target": "W1", "edge_type": "authored", "weight": 1},
                {"source": "C9", "target": "W1", "edge_type": "cites_target_work", "weight": 2}
            ]
        }"#,
    );
    assert!(io::read_graph(&graph_path).unwrap().validate().is_err());

    let out = harness.root.join("vis/topic_network.json");
    let overlay = run_overlay(
        &settings,
        &graph_path,
        &harness.out_dir().join("paper_topics.csv"),
        &out,
    )
    .unwrap();

    let citation = overlay
        .edges_of_type(&EdgeType::CitesTargetWork)
        .find(|e| e.source == "C9")
        .unwrap();
    assert_eq!(citation.target, "W1");
    assert_eq!(citation.weight, 2.0);
    let c9 = overlay.nodes.iter().find(|n| n.id == "C9").unwrap();
    assert_eq!(c9.node_type, NodeType::Unknown);
    assert!(out.exists());
}

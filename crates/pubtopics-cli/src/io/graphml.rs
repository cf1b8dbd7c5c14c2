//! GraphML reading and writing for the citation graph.
//!
//! Data keys map onto the node-link model by attribute name: `node_type`,
//! `label`, `edge_type` and `weight` fill the typed fields, everything else
//! lands in the free-form attributes. Typed numeric keys that fail to parse
//! are kept as strings so weight coercion can decide later.

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Context, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Number, Value};
use tracing::debug;

use pubtopics_graph::{CitationGraph, EdgeType, GraphEdge, GraphNode, NodeType};

#[derive(Debug, Clone)]
struct KeyDef {
    name: String,
    kind: String,
}

enum Element {
    Node(GraphNode),
    Edge(GraphEdge),
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a.context("Malformed GraphML attribute")?;
        if a.key.as_ref() == name {
            return Ok(Some(a.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn required_attr(e: &BytesStart<'_>, name: &[u8]) -> Result<String> {
    match attr(e, name)? {
        Some(value) => Ok(value),
        None => bail!(
            "<{}> is missing `{}`",
            String::from_utf8_lossy(e.name().as_ref()),
            String::from_utf8_lossy(name)
        ),
    }
}

fn typed_value(text: &str, kind: &str) -> Value {
    let trimmed = text.trim();
    match kind {
        "int" | "long" => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "float" | "double" => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        "boolean" => match trimmed {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        _ => Value::String(text.to_string()),
    }
}

fn apply_data(element: &mut Element, key: &KeyDef, text: &str) {
    match element {
        Element::Node(node) => match key.name.as_str() {
            "node_type" => node.node_type = NodeType::from(text.to_string()),
            "label" => node.label = Some(text.to_string()),
            _ => {
                node.attributes
                    .insert(key.name.clone(), typed_value(text, &key.kind));
            }
        },
        Element::Edge(edge) => match key.name.as_str() {
            "edge_type" => edge.edge_type = EdgeType::from(text.to_string()),
            "weight" => edge.weight = Some(typed_value(text, &key.kind)),
            _ => {
                edge.attributes
                    .insert(key.name.clone(), typed_value(text, &key.kind));
            }
        },
    }
}

fn open_element(e: &BytesStart<'_>) -> Result<Option<Element>> {
    match e.name().as_ref() {
        b"node" => Ok(Some(Element::Node(GraphNode {
            id: required_attr(e, b"id")?,
            node_type: NodeType::Unknown,
            label: None,
            attributes: BTreeMap::new(),
        }))),
        b"edge" => Ok(Some(Element::Edge(GraphEdge {
            source: required_attr(e, b"source")?,
            target: required_attr(e, b"target")?,
            edge_type: EdgeType::Unknown,
            weight: None,
            attributes: BTreeMap::new(),
        }))),
        _ => Ok(None),
    }
}

fn close_element(graph: &mut CitationGraph, element: Element) {
    match element {
        Element::Node(node) => graph.add_node(node),
        Element::Edge(edge) => graph.add_edge(edge),
    }
}

/// Parse a GraphML document into a citation graph.
pub fn parse_graphml(content: &str) -> Result<CitationGraph> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut graph = CitationGraph::new();
    let mut keys: HashMap<String, KeyDef> = HashMap::new();
    let mut current: Option<Element> = None;
    let mut data_key: Option<String> = None;
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"key" => {
                    let id = required_attr(e, b"id")?;
                    let name = attr(e, b"attr.name")?.unwrap_or_else(|| id.clone());
                    let kind = attr(e, b"attr.type")?.unwrap_or_else(|| "string".to_string());
                    keys.insert(id, KeyDef { name, kind });
                }
                b"data" => {
                    data_key = Some(required_attr(e, b"key")?);
                    text.clear();
                }
                _ => {
                    if let Some(element) = open_element(e)? {
                        current = Some(element);
                    }
                }
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"key" => {
                    let id = required_attr(e, b"id")?;
                    let name = attr(e, b"attr.name")?.unwrap_or_else(|| id.clone());
                    let kind = attr(e, b"attr.type")?.unwrap_or_else(|| "string".to_string());
                    keys.insert(id, KeyDef { name, kind });
                }
                b"data" => {
                    let key = required_attr(e, b"key")?;
                    if let (Some(element), Some(def)) = (current.as_mut(), keys.get(&key)) {
                        apply_data(element, def, "");
                    }
                }
                _ => {
                    if let Some(element) = open_element(e)? {
                        close_element(&mut graph, element);
                    }
                }
            },
            Ok(Event::Text(ref e)) => {
                if data_key.is_some() {
                    text.push_str(&e.unescape()?);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"data" => {
                    if let Some(key) = data_key.take() {
                        match (current.as_mut(), keys.get(&key)) {
                            (Some(element), Some(def)) => apply_data(element, def, &text),
                            (_, None) => debug!(key = %key, "Data for undeclared GraphML key"),
                            _ => {}
                        }
                    }
                }
                b"node" | b"edge" => {
                    if let Some(element) = current.take() {
                        close_element(&mut graph, element);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => bail!(
                "GraphML error at position {}: {e}",
                reader.buffer_position()
            ),
            _ => {}
        }
        buf.clear();
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Parsed GraphML"
    );
    Ok(graph)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "long",
        _ => "string",
    }
}

fn merge_kind(current: &'static str, next: &'static str) -> &'static str {
    match (current, next) {
        (a, b) if a == b => a,
        ("long", "double") | ("double", "long") => "double",
        _ => "string",
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Declared keys for one domain, in first-seen order.
#[derive(Default)]
struct KeyTable {
    order: Vec<String>,
    kinds: HashMap<String, &'static str>,
}

impl KeyTable {
    fn observe(&mut self, name: &str, kind: &'static str) {
        match self.kinds.get_mut(name) {
            Some(existing) => *existing = merge_kind(*existing, kind),
            None => {
                self.order.push(name.to_string());
                self.kinds.insert(name.to_string(), kind);
            }
        }
    }
}

fn declare_keys(
    out: &mut String,
    domain: &str,
    table: &KeyTable,
    next_id: &mut usize,
) -> HashMap<String, String> {
    let mut ids = HashMap::new();
    for name in &table.order {
        let id = format!("d{next_id}");
        *next_id += 1;
        out.push_str(&format!(
            "  <key id=\"{id}\" for=\"{domain}\" attr.name=\"{}\" attr.type=\"{}\" />\n",
            escape(name.as_str()),
            table.kinds[name]
        ));
        ids.insert(name.clone(), id);
    }
    ids
}

fn push_data(out: &mut String, ids: &HashMap<String, String>, name: &str, text: &str) {
    if let Some(id) = ids.get(name) {
        out.push_str(&format!("      <data key=\"{id}\">{}</data>\n", escape(text)));
    }
}

/// Serialize a citation graph as a directed GraphML document.
pub fn to_graphml(graph: &CitationGraph) -> String {
    let mut node_keys = KeyTable::default();
    let mut edge_keys = KeyTable::default();

    for node in graph.nodes() {
        if node.node_type != NodeType::Unknown {
            node_keys.observe("node_type", "string");
        }
        if node.label.is_some() {
            node_keys.observe("label", "string");
        }
        for (name, value) in &node.attributes {
            node_keys.observe(name, kind_of(value));
        }
    }
    for edge in graph.edges() {
        if edge.edge_type != EdgeType::Unknown {
            edge_keys.observe("edge_type", "string");
        }
        if let Some(weight) = &edge.weight {
            edge_keys.observe("weight", kind_of(weight));
        }
        for (name, value) in &edge.attributes {
            edge_keys.observe(name, kind_of(value));
        }
    }

    let mut out = String::from("<?xml version='1.0' encoding='utf-8'?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");

    let mut next_id = 0usize;
    let node_ids = declare_keys(&mut out, "node", &node_keys, &mut next_id);
    let edge_ids = declare_keys(&mut out, "edge", &edge_keys, &mut next_id);

    out.push_str("  <graph edgedefault=\"directed\">\n");

    for node in graph.nodes() {
        out.push_str(&format!("    <node id=\"{}\">\n", escape(node.id.as_str())));
        if node.node_type != NodeType::Unknown {
            push_data(&mut out, &node_ids, "node_type", node.node_type.as_str());
        }
        if let Some(label) = &node.label {
            push_data(&mut out, &node_ids, "label", label);
        }
        for (name, value) in &node.attributes {
            push_data(&mut out, &node_ids, name, &value_text(value));
        }
        out.push_str("    </node>\n");
    }

    for edge in graph.edges() {
        out.push_str(&format!(
            "    <edge source=\"{}\" target=\"{}\">\n",
            escape(edge.source.as_str()),
            escape(edge.target.as_str())
        ));
        if edge.edge_type != EdgeType::Unknown {
            push_data(&mut out, &edge_ids, "edge_type", edge.edge_type.as_str());
        }
        if let Some(weight) = &edge.weight {
            push_data(&mut out, &edge_ids, "weight", &value_text(weight));
        }
        for (name, value) in &edge.attributes {
            push_data(&mut out, &edge_ids, name, &value_text(value));
        }
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n</graphml>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="node" attr.name="node_type" attr.type="string" />
  <key id="d1" for="node" attr.name="label" attr.type="string" />
  <key id="d2" for="node" attr.name="year" attr.type="long" />
  <key id="d3" for="edge" attr.name="edge_type" attr.type="string" />
  <key id="d4" for="edge" attr.name="weight" attr.type="long" />
  <graph edgedefault="directed">
    <node id="A1">
      <data key="d0">target_author</data>
      <data key="d1">Kim &amp; Lee</data>
    </node>
    <node id="W1">
      <data key="d0">target_work</data>
      <data key="d1">Precast joints</data>
      <data key="d2">2021</data>
    </node>
    <node id="C1"><data key="d0">citing_author</data></node>
    <node id="X" />
    <edge source="A1" target="W1">
      <data key="d3">authored</data>
      <data key="d4">1</data>
    </edge>
    <edge source="C1" target="W1">
      <data key="d3">cites_target_work</data>
      <data key="d4">abc</data>
    </edge>
  </graph>
</graphml>"#;

    #[test]
    fn test_parse_graphml() {
        let graph = parse_graphml(SAMPLE).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);

        let author = graph.node("A1").unwrap();
        assert_eq!(author.node_type, NodeType::TargetAuthor);
        assert_eq!(author.label.as_deref(), Some("Kim & Lee"));

        let work = graph.node("W1").unwrap();
        assert_eq!(work.attributes["year"], Value::from(2021));

        assert_eq!(graph.node("X").unwrap().node_type, NodeType::Unknown);

        let edges = graph.edges();
        assert_eq!(edges[0].edge_type, EdgeType::Authored);
        assert_eq!(edges[0].weight, Some(Value::from(1)));
        assert_eq!(edges[1].weight, Some(Value::String("abc".to_string())));
    }

    #[test]
    fn test_graphml_round_trip_keeps_types() {
        let graph = parse_graphml(SAMPLE).unwrap();
        let written = to_graphml(&graph);
        assert!(written.contains("Kim &amp; Lee"));

        let reparsed = parse_graphml(&written).unwrap();
        assert_eq!(reparsed.node("A1"), graph.node("A1"));
        assert_eq!(reparsed.node("W1"), graph.node("W1"));
        // Mixed long/string weights are declared as strings on the way out
        assert_eq!(
            reparsed.edges()[0].weight,
            Some(Value::String("1".to_string()))
        );
        assert_eq!(reparsed.edges()[1].edge_type, EdgeType::CitesTargetWork);
    }

    #[test]
    fn test_parse_rejects_edge_without_target() {
        let doc = r#"<graphml><graph><edge source="A" /></graph></graphml>"#;
        assert!(parse_graphml(doc).is_err());
    }
}

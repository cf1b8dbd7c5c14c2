//! File formats exchanged with the fetch scripts and the renderer.

pub mod graphml;
pub mod tables;

use std::path::Path;

use anyhow::{Context, Result};
use pubtopics_graph::CitationGraph;

/// Read a citation graph, choosing the format by file extension.
pub fn read_graph(path: &Path) -> Result<CitationGraph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph {}", path.display()))?;

    if has_extension(path, "graphml") {
        graphml::parse_graphml(&content)
            .with_context(|| format!("Failed to parse GraphML {}", path.display()))
    } else {
        CitationGraph::from_json(&content)
            .with_context(|| format!("Failed to parse graph JSON {}", path.display()))
    }
}

/// Write a citation graph, choosing the format by file extension.
pub fn write_graph(path: &Path, graph: &CitationGraph) -> Result<()> {
    let content = if has_extension(path, "graphml") {
        graphml::to_graphml(graph)
    } else {
        graph.to_json()?
    };
    write_file(path, &content)
}

/// Write a text file, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

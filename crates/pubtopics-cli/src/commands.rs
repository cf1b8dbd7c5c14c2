//! Command implementations for the pubtopics binary.
//!
//! Handles:
//! - assign: keyword topics from a topic definition table
//! - cluster: topics discovered by clustering concept vectors
//! - build-graph: citation graph from the works and citation tables
//! - overlay: topic hubs added to an existing citation graph

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use pubtopics_graph::{CitationGraph, CitationGraphBuilder, GraphOverlay, OverlayGraph};
use pubtopics_topics::{
    assignment_rows, ClusterEngine, ConceptStore, KeywordCatalog, PipelineOutput, TopicPipeline,
    TopicResolver,
};
use pubtopics_types::{Paper, PaperId, Settings};

use crate::cli::{Cli, Commands};
use crate::io::{self, tables};

/// File names written into the output directory.
pub const PAPER_TOPICS_FILE: &str = "paper_topics.csv";
pub const TOPIC_SUMMARY_FILE: &str = "topic_summary.csv";
pub const RUN_REPORT_FILE: &str = "run_report.json";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured log level.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Load configuration, apply CLI overrides and dispatch.
pub fn run_command(cli: Cli) -> Result<()> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }

    init_logging(&settings)?;

    match cli.command {
        Commands::Assign {
            works,
            concepts,
            topics,
            out_dir,
        } => {
            if let Some(dir) = out_dir {
                settings.output_dir = dir.to_string_lossy().into_owned();
            }
            run_assign(&settings, &works, &concepts, &topics).context("assign stage failed")?;
        }
        Commands::Cluster {
            works,
            concepts,
            max_clusters,
            out_dir,
        } => {
            if let Some(dir) = out_dir {
                settings.output_dir = dir.to_string_lossy().into_owned();
            }
            if let Some(k) = max_clusters {
                settings.topics.max_clusters = k;
            }
            run_cluster(&settings, &works, &concepts).context("cluster stage failed")?;
        }
        Commands::BuildGraph {
            works,
            citations,
            author_id,
            author_name,
            orcid,
            out,
        } => {
            build_graph(
                &works,
                &citations,
                &author_id,
                &author_name,
                orcid.as_deref(),
                &out,
            )
            .context("graph build stage failed")?;
        }
        Commands::Overlay {
            graph,
            assignments,
            include_unassigned,
            out,
        } => {
            if include_unassigned {
                settings.overlay.include_unassigned = true;
            }
            run_overlay(&settings, &graph, &assignments, &out).context("overlay stage failed")?;
        }
    }

    Ok(())
}

fn load_store(settings: &Settings, concepts: &Path) -> Result<ConceptStore> {
    let records = tables::read_concepts(concepts)?;
    Ok(ConceptStore::from_records_capped(
        records,
        settings.topics.max_concepts_per_paper,
    ))
}

/// Run a resolver over the concept table and write the output tables.
fn run_pipeline(
    settings: &Settings,
    resolver: &dyn TopicResolver,
    works: &std::collections::BTreeMap<PaperId, Paper>,
    store: &ConceptStore,
) -> Result<PipelineOutput> {
    let output = TopicPipeline::from_config(&settings.topics).run(resolver, store)?;

    let out_dir = settings.output_path();
    let rows = assignment_rows(&output.assignment, works);
    tables::write_assignments(&out_dir.join(PAPER_TOPICS_FILE), &rows, output.mode)?;
    tables::write_summary(&out_dir.join(TOPIC_SUMMARY_FILE), &output.summary, output.mode)?;

    let report = serde_json::to_string_pretty(&output.report)?;
    io::write_file(&out_dir.join(RUN_REPORT_FILE), &report)?;

    info!(
        mode = %output.mode,
        out_dir = %out_dir.display(),
        "Wrote topic tables"
    );
    Ok(output)
}

/// Keyword mode: assign papers to the topics in the definition table.
pub fn run_assign(
    settings: &Settings,
    works: &Path,
    concepts: &Path,
    topics: &Path,
) -> Result<PipelineOutput> {
    let works = tables::read_works(works)?;
    let store = load_store(settings, concepts)?;
    let catalog = KeywordCatalog::new(tables::read_topics(topics)?)?;
    info!(topics = catalog.len(), "Loaded topic catalog");

    run_pipeline(settings, &catalog, &works, &store)
}

/// Discovery mode: cluster papers over allow-listed concepts.
pub fn run_cluster(settings: &Settings, works: &Path, concepts: &Path) -> Result<PipelineOutput> {
    let works = tables::read_works(works)?;
    let store = load_store(settings, concepts)?;
    let engine = ClusterEngine::from_config(&settings.topics)?;

    run_pipeline(settings, &engine, &works, &store)
}

/// Build the citation graph and write it as JSON or GraphML.
pub fn build_graph(
    works: &Path,
    citations: &Path,
    author_id: &str,
    author_name: &str,
    orcid: Option<&str>,
    out: &Path,
) -> Result<CitationGraph> {
    let works = tables::read_works(works)?;
    let records = tables::read_citations(citations)?;

    let mut builder = CitationGraphBuilder::new(author_id, author_name);
    if let Some(orcid) = orcid {
        builder = builder.orcid(orcid);
    }
    for paper in works.values() {
        builder.add_work(paper);
    }
    for record in &records {
        builder.add_citation(record);
    }

    let graph = builder.build();
    io::write_graph(out, &graph)?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        out = %out.display(),
        "Wrote citation graph"
    );
    Ok(graph)
}

/// Overlay an assignment table on a citation graph.
pub fn run_overlay(
    settings: &Settings,
    graph: &Path,
    assignments: &Path,
    out: &Path,
) -> Result<OverlayGraph> {
    let graph = io::read_graph(graph)?;
    if let Err(err) = graph.validate() {
        warn!(
            error = %err,
            "Citation graph has edges to undeclared nodes, keeping them as untyped nodes"
        );
    }
    let (assignment, titles) = tables::read_assignments(assignments)?;

    let overlay = GraphOverlay::new(settings.overlay.include_unassigned)
        .with_titles(titles)
        .apply(&graph, &assignment);

    io::write_file(out, &overlay.to_json()?)?;
    info!(
        nodes = overlay.nodes.len(),
        edges = overlay.edges.len(),
        out = %out.display(),
        "Wrote topic overlay"
    );
    Ok(overlay)
}

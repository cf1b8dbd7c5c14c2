//! Publication topic pipeline
//!
//! Assigns the lab's papers to topics and overlays the result on the
//! citation graph shown on the lab website.
//!
//! # Usage
//!
//! ```bash
//! pubtopics assign --works orcid_works.csv --concepts paper_concepts.csv --topics topic_definition.csv
//! pubtopics cluster --works orcid_works.csv --concepts paper_concepts.csv
//! pubtopics build-graph --works orcid_works.csv --citations edges.csv --author-id A123 --author-name "Kim"
//! pubtopics overlay --graph vis/orcid_citation_network.graphml --assignments paper_topics.csv
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/pubtopics/config.toml)
//! 3. Environment variables (PUBTOPICS_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use pubtopics_cli::{run_command, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_command(cli)
}

//! CLI argument parsing for pubtopics.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Publication topic pipeline
///
/// Assigns papers to topics and builds the topic overlay graph.
#[derive(Parser, Debug)]
#[command(name = "pubtopics")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/pubtopics/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Pipeline commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign papers to keyword-defined topics
    Assign {
        /// Works table
        #[arg(long, default_value = "orcid_works.csv")]
        works: PathBuf,

        /// Concepts table
        #[arg(long, default_value = "paper_concepts.csv")]
        concepts: PathBuf,

        /// Topic definition table
        #[arg(long, default_value = "topic_definition.csv")]
        topics: PathBuf,

        /// Override output directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Discover topics by clustering concept vectors
    Cluster {
        /// Works table
        #[arg(long, default_value = "orcid_works.csv")]
        works: PathBuf,

        /// Concepts table
        #[arg(long, default_value = "paper_concepts.csv")]
        concepts: PathBuf,

        /// Override the maximum number of clusters
        #[arg(short = 'k', long)]
        max_clusters: Option<usize>,

        /// Override output directory
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Build the citation graph from the works and citation tables
    BuildGraph {
        /// Works table
        #[arg(long, default_value = "orcid_works.csv")]
        works: PathBuf,

        /// Citing-author to work table
        #[arg(long, default_value = "edges_citingAuthor_to_orcidWorks.csv")]
        citations: PathBuf,

        /// Target author id
        #[arg(long)]
        author_id: String,

        /// Target author display name
        #[arg(long)]
        author_name: String,

        /// Target author ORCID
        #[arg(long)]
        orcid: Option<String>,

        /// Output graph (.json or .graphml)
        #[arg(long, default_value = "vis/orcid_citation_network.json")]
        out: PathBuf,
    },

    /// Overlay topic assignments on the citation graph
    Overlay {
        /// Citation graph (.json or .graphml)
        #[arg(long, default_value = "vis/orcid_citation_network.graphml")]
        graph: PathBuf,

        /// Paper-topic table written by `assign` or `cluster`
        #[arg(long, default_value = "paper_topics.csv")]
        assignments: PathBuf,

        /// Add a hub for unassigned papers
        #[arg(long)]
        include_unassigned: bool,

        /// Output overlay JSON
        #[arg(long, default_value = "vis/orcid_topic_network.json")]
        out: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_assign_defaults() {
        let cli = Cli::parse_from(["pubtopics", "assign"]);
        match cli.command {
            Commands::Assign {
                works,
                concepts,
                topics,
                out_dir,
            } => {
                assert_eq!(works, PathBuf::from("orcid_works.csv"));
                assert_eq!(concepts, PathBuf::from("paper_concepts.csv"));
                assert_eq!(topics, PathBuf::from("topic_definition.csv"));
                assert!(out_dir.is_none());
            }
            _ => panic!("Expected Assign command"),
        }
    }

    #[test]
    fn test_cli_cluster_with_k() {
        let cli = Cli::parse_from(["pubtopics", "cluster", "-k", "3", "--out-dir", "out"]);
        match cli.command {
            Commands::Cluster {
                max_clusters,
                out_dir,
                ..
            } => {
                assert_eq!(max_clusters, Some(3));
                assert_eq!(out_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("Expected Cluster command"),
        }
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["pubtopics", "--config", "/path/to/config.toml", "cluster"]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
    }

    #[test]
    fn test_cli_global_log_level_after_subcommand() {
        let cli = Cli::parse_from(["pubtopics", "cluster", "--log-level", "debug"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_build_graph_requires_author() {
        let result = Cli::try_parse_from(["pubtopics", "build-graph"]);
        assert!(result.is_err());

        let cli = Cli::parse_from([
            "pubtopics",
            "build-graph",
            "--author-id",
            "A1",
            "--author-name",
            "Kim",
        ]);
        assert!(matches!(cli.command, Commands::BuildGraph { .. }));
    }

    #[test]
    fn test_cli_overlay_flag() {
        let cli = Cli::parse_from(["pubtopics", "overlay", "--include-unassigned"]);
        match cli.command {
            Commands::Overlay {
                include_unassigned, ..
            } => assert!(include_unassigned),
            _ => panic!("Expected Overlay command"),
        }
    }
}

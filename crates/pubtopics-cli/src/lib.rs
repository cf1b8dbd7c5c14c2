//! Command-line front end for the publication topic pipeline.
//!
//! Owns everything the core crates leave out: argument parsing, logging
//! setup, and reading/writing the CSV, JSON and GraphML files exchanged with
//! the fetch scripts and the website renderer.

pub mod cli;
pub mod commands;
pub mod io;

pub use cli::{Cli, Commands};
pub use commands::{build_graph, init_logging, run_assign, run_cluster, run_command, run_overlay};

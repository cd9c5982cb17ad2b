//! CLI module for FrameDeck
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// FrameDeck - turn a video into a deck of distinct frames
///
/// Samples a video at a fixed stride, drops near-duplicate frames and
/// assembles the selected ones into a paginated PDF.
#[derive(Parser, Debug)]
#[command(name = "framedeck")]
#[command(about = "FrameDeck - Extract distinct video frames into a PDF")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Configuration file (default: framedeck.toml, then config/framedeck.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample a video and write its distinct frames plus a manifest
    Extract(args::ExtractArgs),
    /// Build a PDF from a frame manifest
    Export(args::ExportArgs),
    /// Extract and export in one go
    Run(args::RunArgs),
    /// List the frames of a manifest
    Inspect(args::InspectArgs),
}

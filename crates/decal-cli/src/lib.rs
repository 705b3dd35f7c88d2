//! # decal-cli
//!
//! Operator command-line interface for the fulfillment pipeline.
//!
//! ## Commands
//!
//! - `decal replay` - Re-drive fulfillment from an exported order list
//! - `decal resolve` - Show the template key a title and variant map to
//!
//! ## Configuration
//!
//! `replay` reads the same `DECAL_*` environment variables as the
//! server; `resolve` is pure and needs no configuration.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod commands;

use clap::{Parser, Subcommand};

/// Decal CLI - fulfillment pipeline operations.
#[derive(Debug, Parser)]
#[command(name = "decal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Re-drive fulfillment from an exported order list.
    Replay(commands::replay::ReplayArgs),
    /// Show the template key a title and variant resolve to.
    Resolve(commands::resolve::ResolveArgs),
}

/// Output format.
#[derive(Debug, Clone, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

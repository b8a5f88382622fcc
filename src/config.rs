//! Configuration module.
//!
//! This module defines the command-line interface (CLI) for the patcher using
//! `clap`: subcommands for extracting, replacing, and listing the script
//! modules embedded in a standalone executable.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Extract and replace script modules embedded in Bun standalone executables.
///
/// Standalone executables carry their modules in a trailing overlay; this
/// tool reads and rewrites that overlay directly, without the runtime's own
/// build tooling.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", help = "Set the logging level")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a module's raw script content
    Extract {
        /// Path to the standalone executable
        input: PathBuf,

        /// Name of the embedded module (path suffixes and .exe variants match too)
        #[arg(short, long)]
        module: String,

        /// Write the content here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a module's content in place and re-emit the executable
    Replace {
        /// Path to the standalone executable
        input: PathBuf,

        /// File holding the replacement content (must not exceed the original size)
        content: PathBuf,

        /// Name of the embedded module
        #[arg(short, long)]
        module: String,

        /// Output path (defaults to rewriting the input atomically)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the modules embedded in an executable
    List {
        /// Path to the standalone executable
        input: PathBuf,
    },
}

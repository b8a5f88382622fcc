//! Entry point for the bunpatch CLI.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Initialize `tracing` with the requested log level.
//! 3. Dispatch to the extract, replace, or list pipeline.
//!
//! Error handling is done via `anyhow`.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use bunpatch::config::{Command, Config};
use bunpatch::patcher;

fn main() -> Result<()> {
    let config = Config::parse();

    let filter = tracing_subscriber::EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match config.command {
        Command::Extract {
            input,
            module,
            output,
        } => {
            let contents = patcher::extract(&input, &module)?;
            match output {
                Some(path) => std::fs::write(&path, &contents)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => std::io::stdout().write_all(&contents)?,
            }
        }
        Command::Replace {
            input,
            content,
            module,
            output,
        } => {
            let new_contents = std::fs::read(&content)
                .with_context(|| format!("failed to read {}", content.display()))?;
            let output = output.unwrap_or_else(|| input.clone());
            patcher::replace_module(&input, &output, &module, &new_contents)?;
            println!("Patched {} in {}", module, output.display());
        }
        Command::List { input } => {
            for name in patcher::list_modules(&input)? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

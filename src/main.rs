//! API documentation generator - command-line entry point.
//!
//! Reads declaration manifests (JSON or YAML) produced by an introspection
//! step and renders them as an HTML page, an OpenAPI 3.0.3 document or
//! Markdown.
//!
//! # Usage
//!
//! ```bash
//! apidoc-from-source [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Render the HTML reference:
//! ```bash
//! apidoc-from-source ./declarations -o docs/index.html
//! ```
//!
//! Generate an OpenAPI document:
//! ```bash
//! apidoc-from-source ./declarations -f json --title "Shop API" -o openapi.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! apidoc-from-source ./declarations -f markdown -v
//! ```

use anyhow::Result;
use apidoc_from_source::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can configure the logger
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("API documentation generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
